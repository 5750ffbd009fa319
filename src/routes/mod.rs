/// Router Module Index
///
/// Routes are split by access level so that authentication is applied once, as a
/// layer over the whole authenticated table, instead of inside each handler.

/// Routes open to anonymous clients: reads, sign up and login.
pub mod public;

/// Routes behind the `authenticate` layer. Ownership is checked by the services;
/// role checks are attached per route.
pub mod authenticated;

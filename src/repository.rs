use crate::models::{
    Category, CreateRestaurantRequest, ImageRef, Location, Meal, MealCategory, NewUser,
    Restaurant, Role, UpdateMealRequest, UpdateRestaurantRequest, User, UserCredentials,
};
use crate::pagination::{PageRequest, like_pattern, matches_keyword};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use std::{str::FromStr, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepoError
///
/// Persistence failures. Unique-key violations are lifted out of the driver error
/// so the service boundary can report them as 409.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Conflict(String),

    /// A referenced parent row does not exist (foreign-key violation).
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Insert payload for a restaurant. The owner comes from the session.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub user_id: Uuid,
    pub details: CreateRestaurantRequest,
    pub location: Option<Location>,
}

/// Partial update for a restaurant.
///
/// `location` is `None` when the address is unchanged. `Some(None)` clears the
/// stored point because the new address could not be geocoded.
#[derive(Debug, Clone, Default)]
pub struct RestaurantChanges {
    pub details: UpdateRestaurantRequest,
    pub location: Option<Option<Location>>,
}

/// Insert payload for a meal.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: MealCategory,
}

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers and services
/// only ever see `Arc<dyn Repository>`, so Postgres and the in-memory store are
/// interchangeable.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>>;
    /// Fails with `RepoError::Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;

    // --- Restaurants ---
    /// Keyword-filtered page, ordered by creation time.
    async fn list_restaurants(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<Vec<Restaurant>>;
    async fn get_restaurant(&self, id: Uuid) -> RepoResult<Option<Restaurant>>;
    async fn create_restaurant(&self, restaurant: NewRestaurant) -> RepoResult<Restaurant>;
    async fn update_restaurant(
        &self,
        id: Uuid,
        changes: RestaurantChanges,
    ) -> RepoResult<Option<Restaurant>>;
    /// Replaces the whole image list.
    async fn set_restaurant_images(
        &self,
        id: Uuid,
        images: Vec<ImageRef>,
    ) -> RepoResult<Option<Restaurant>>;
    /// Appends a meal id to the menu in a single-row update.
    async fn push_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool>;
    /// Removes a meal id from the menu in a single-row update.
    async fn pull_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool>;
    /// Deletes the restaurant and, through the foreign key, its meals.
    async fn delete_restaurant(&self, id: Uuid) -> RepoResult<bool>;

    // --- Meals ---
    async fn list_meals(&self) -> RepoResult<Vec<Meal>>;
    async fn list_meals_by_restaurant(&self, restaurant_id: Uuid) -> RepoResult<Vec<Meal>>;
    async fn get_meal(&self, id: Uuid) -> RepoResult<Option<Meal>>;
    async fn create_meal(&self, meal: NewMeal) -> RepoResult<Meal>;
    async fn update_meal(&self, id: Uuid, changes: UpdateMealRequest) -> RepoResult<Option<Meal>>;
    async fn delete_meal(&self, id: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Row types ---

fn decode_error(msg: String) -> RepoError {
    RepoError::Database(sqlx::Error::Decode(msg.into()))
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_credentials(self) -> RepoResult<UserCredentials> {
        let role = Role::from_str(&self.role).map_err(decode_error)?;
        Ok(UserCredentials {
            user: User {
                id: self.id,
                email: self.email,
                name: self.name,
                role,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct RestaurantRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    email: String,
    phone_no: i64,
    address: String,
    category: String,
    images: Json<Vec<ImageRef>>,
    location: Option<Json<Location>>,
    menu: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = RepoError;

    fn try_from(row: RestaurantRow) -> RepoResult<Self> {
        Ok(Restaurant {
            id: row.id,
            name: row.name,
            description: row.description,
            email: row.email,
            phone_no: row.phone_no,
            address: row.address,
            category: Category::from_str(&row.category).map_err(decode_error)?,
            images: row.images.0,
            location: row.location.map(|l| l.0),
            menu: row.menu,
            user: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct MealRow {
    id: Uuid,
    restaurant_id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    price: f64,
    category: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MealRow> for Meal {
    type Error = RepoError;

    fn try_from(row: MealRow) -> RepoResult<Self> {
        Ok(Meal {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: MealCategory::from_str(&row.category).map_err(decode_error)?,
            restaurant: row.restaurant_id,
            user: row.user_id,
            created_at: row.created_at,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> RepoResult<Vec<T>>
where
    T: TryFrom<R, Error = RepoError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";
const RESTAURANT_COLUMNS: &str = "id, user_id, name, description, email, phone_no, address, \
     category, images, location, menu, created_at";
const MEAL_COLUMNS: &str =
    "id, restaurant_id, user_id, name, description, price, category, created_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.into_credentials().map(|c| c.user)).transpose()
    }

    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_credentials).transpose()
    }

    /// create_user
    ///
    /// Relies on the unique index over `LOWER(email)`; a violation becomes `Conflict`.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation_as_conflict(e, "Duplicate email entered."))?;
        Ok(row.into_credentials()?.user)
    }

    /// list_restaurants
    ///
    /// Uses QueryBuilder for safe parameterization. The keyword is escaped so LIKE
    /// wildcards typed by the client match literally.
    async fn list_restaurants(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<Vec<Restaurant>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants"));

        if let Some(k) = keyword {
            builder.push(" WHERE name ILIKE ");
            builder.push_bind(like_pattern(k));
        }

        builder.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows = builder
            .build_query_as::<RestaurantRow>()
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn get_restaurant(&self, id: Uuid) -> RepoResult<Option<Restaurant>> {
        let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1");
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> RepoResult<Restaurant> {
        let NewRestaurant {
            user_id,
            details,
            location,
        } = restaurant;
        let sql = format!(
            "INSERT INTO restaurants \
                (id, user_id, name, description, email, phone_no, address, category, location, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) \
             RETURNING {RESTAURANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&details.name)
            .bind(&details.description)
            .bind(&details.email)
            .bind(details.phone_no)
            .bind(&details.address)
            .bind(details.category.as_str())
            .bind(location.map(Json))
            .fetch_one(&self.pool)
            .await?;
        Restaurant::try_from(row)
    }

    /// update_restaurant
    ///
    /// Uses COALESCE so only the provided fields change. `user_id` is never touched.
    /// The location is written whenever the caller relocated the restaurant, NULL included.
    async fn update_restaurant(
        &self,
        id: Uuid,
        changes: RestaurantChanges,
    ) -> RepoResult<Option<Restaurant>> {
        let RestaurantChanges { details, location } = changes;
        let relocate = location.is_some();
        let sql = format!(
            "UPDATE restaurants \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 email = COALESCE($4, email), \
                 phone_no = COALESCE($5, phone_no), \
                 address = COALESCE($6, address), \
                 category = COALESCE($7, category), \
                 location = CASE WHEN $9 THEN $8 ELSE location END \
             WHERE id = $1 \
             RETURNING {RESTAURANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id)
            .bind(details.name)
            .bind(details.description)
            .bind(details.email)
            .bind(details.phone_no)
            .bind(details.address)
            .bind(details.category.map(|c| c.as_str()))
            .bind(location.flatten().map(Json))
            .bind(relocate)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn set_restaurant_images(
        &self,
        id: Uuid,
        images: Vec<ImageRef>,
    ) -> RepoResult<Option<Restaurant>> {
        let sql = format!(
            "UPDATE restaurants SET images = $2 WHERE id = $1 RETURNING {RESTAURANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id)
            .bind(Json(images))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn push_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("UPDATE restaurants SET menu = array_append(menu, $2) WHERE id = $1")
            .bind(restaurant_id)
            .bind(meal_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn pull_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("UPDATE restaurants SET menu = array_remove(menu, $2) WHERE id = $1")
            .bind(restaurant_id)
            .bind(meal_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_restaurant(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_meals(&self) -> RepoResult<Vec<Meal>> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query_as::<_, MealRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn list_meals_by_restaurant(&self, restaurant_id: Uuid) -> RepoResult<Vec<Meal>> {
        let sql = format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE restaurant_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, MealRow>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn get_meal(&self, id: Uuid) -> RepoResult<Option<Meal>> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1");
        let row = sqlx::query_as::<_, MealRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Meal::try_from).transpose()
    }

    async fn create_meal(&self, meal: NewMeal) -> RepoResult<Meal> {
        let sql = format!(
            "INSERT INTO meals (id, restaurant_id, user_id, name, description, price, category, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING {MEAL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MealRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(meal.restaurant_id)
            .bind(meal.user_id)
            .bind(&meal.name)
            .bind(&meal.description)
            .bind(meal.price)
            .bind(meal.category.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| foreign_key_violation_as_not_found(e, RESTAURANT_GONE))?;
        Meal::try_from(row)
    }

    async fn update_meal(&self, id: Uuid, changes: UpdateMealRequest) -> RepoResult<Option<Meal>> {
        let sql = format!(
            "UPDATE meals \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 category = COALESCE($5, category) \
             WHERE id = $1 \
             RETURNING {MEAL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MealRow>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.price)
            .bind(changes.category.map(|c| c.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Meal::try_from).transpose()
    }

    async fn delete_meal(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

const RESTAURANT_GONE: &str = "Restaurant not found with this Id.";

fn foreign_key_violation_as_not_found(err: sqlx::Error, message: &str) -> RepoError {
    let is_fk = matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    if is_fk {
        RepoError::NotFound(message.to_string())
    } else {
        RepoError::Database(err)
    }
}

fn unique_violation_as_conflict(err: sqlx::Error, message: &str) -> RepoError {
    let is_unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
    if is_unique {
        RepoError::Conflict(message.to_string())
    } else {
        RepoError::Database(err)
    }
}

// --- In-process implementation ---

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    restaurants: Vec<Restaurant>,
    meals: Vec<Meal>,
}

/// InMemoryRepository
///
/// A `Repository` held in process memory with the same observable rules as the
/// Postgres schema: unique emails, creation-ordered listings and cascading meal
/// deletion. Used by the test suites and for running the API without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|c| c.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::Conflict("Duplicate email entered.".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(UserCredentials {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn list_restaurants(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<Vec<Restaurant>> {
        let tables = self.tables.read().await;
        let matching = tables
            .restaurants
            .iter()
            .filter(|r| matches_keyword(&r.name, keyword))
            .cloned();
        Ok(page.slice(matching))
    }

    async fn get_restaurant(&self, id: Uuid) -> RepoResult<Option<Restaurant>> {
        let tables = self.tables.read().await;
        Ok(tables.restaurants.iter().find(|r| r.id == id).cloned())
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> RepoResult<Restaurant> {
        let NewRestaurant {
            user_id,
            details,
            location,
        } = restaurant;
        let created = Restaurant {
            id: Uuid::new_v4(),
            name: details.name,
            description: details.description,
            email: details.email,
            phone_no: details.phone_no,
            address: details.address,
            category: details.category,
            images: Vec::new(),
            location,
            menu: Vec::new(),
            user: user_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.restaurants.push(created.clone());
        Ok(created)
    }

    async fn update_restaurant(
        &self,
        id: Uuid,
        changes: RestaurantChanges,
    ) -> RepoResult<Option<Restaurant>> {
        let mut tables = self.tables.write().await;
        let Some(r) = tables.restaurants.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        let RestaurantChanges { details, location } = changes;
        if let Some(name) = details.name {
            r.name = name;
        }
        if let Some(description) = details.description {
            r.description = description;
        }
        if let Some(email) = details.email {
            r.email = email;
        }
        if let Some(phone_no) = details.phone_no {
            r.phone_no = phone_no;
        }
        if let Some(address) = details.address {
            r.address = address;
        }
        if let Some(category) = details.category {
            r.category = category;
        }
        if let Some(location) = location {
            r.location = location;
        }
        Ok(Some(r.clone()))
    }

    async fn set_restaurant_images(
        &self,
        id: Uuid,
        images: Vec<ImageRef>,
    ) -> RepoResult<Option<Restaurant>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .restaurants
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| {
                r.images = images;
                r.clone()
            }))
    }

    async fn push_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.restaurants.iter_mut().find(|r| r.id == restaurant_id) {
            Some(r) => {
                r.menu.push(meal_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_menu_item(&self, restaurant_id: Uuid, meal_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.restaurants.iter_mut().find(|r| r.id == restaurant_id) {
            Some(r) => {
                r.menu.retain(|id| *id != meal_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_restaurant(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.restaurants.len();
        tables.restaurants.retain(|r| r.id != id);
        let deleted = tables.restaurants.len() < before;
        if deleted {
            tables.meals.retain(|m| m.restaurant != id);
        }
        Ok(deleted)
    }

    async fn list_meals(&self) -> RepoResult<Vec<Meal>> {
        Ok(self.tables.read().await.meals.clone())
    }

    async fn list_meals_by_restaurant(&self, restaurant_id: Uuid) -> RepoResult<Vec<Meal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .meals
            .iter()
            .filter(|m| m.restaurant == restaurant_id)
            .cloned()
            .collect())
    }

    async fn get_meal(&self, id: Uuid) -> RepoResult<Option<Meal>> {
        let tables = self.tables.read().await;
        Ok(tables.meals.iter().find(|m| m.id == id).cloned())
    }

    async fn create_meal(&self, meal: NewMeal) -> RepoResult<Meal> {
        let mut tables = self.tables.write().await;
        if !tables.restaurants.iter().any(|r| r.id == meal.restaurant_id) {
            return Err(RepoError::NotFound(RESTAURANT_GONE.to_string()));
        }
        let created = Meal {
            id: Uuid::new_v4(),
            name: meal.name,
            description: meal.description,
            price: meal.price,
            category: meal.category,
            restaurant: meal.restaurant_id,
            user: meal.user_id,
            created_at: Utc::now(),
        };
        tables.meals.push(created.clone());
        Ok(created)
    }

    async fn update_meal(&self, id: Uuid, changes: UpdateMealRequest) -> RepoResult<Option<Meal>> {
        let mut tables = self.tables.write().await;
        let Some(m) = tables.meals.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            m.name = name;
        }
        if let Some(description) = changes.description {
            m.description = description;
        }
        if let Some(price) = changes.price {
            m.price = price;
        }
        if let Some(category) = changes.category {
            m.category = category;
        }
        Ok(Some(m.clone()))
    }

    async fn delete_meal(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.meals.len();
        tables.meals.retain(|m| m.id != id);
        Ok(tables.meals.len() < before)
    }
}

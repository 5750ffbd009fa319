use validator::Validate;

use crate::{
    auth::{AuthUser, authorize_owner},
    error::{AppError, AppResult},
    models::{CreateMealRequest, DeleteResponse, Meal, UpdateMealRequest, parse_id},
    repository::{NewMeal, RepositoryState},
};

/// MealService
///
/// Meal CRUD. Keeps every restaurant's `menu` equal to the set of meals that point
/// at it: the id is appended after the meal exists and removed before it goes.
#[derive(Clone)]
pub struct MealService {
    repo: RepositoryState,
}

impl MealService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Meal>> {
        Ok(self.repo.list_meals().await?)
    }

    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> AppResult<Vec<Meal>> {
        let restaurant_id = parse_id(restaurant_id)?;
        Ok(self.repo.list_meals_by_restaurant(restaurant_id).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Meal> {
        let id = parse_id(id)?;
        self.repo
            .get_meal(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Meal not found with this Id.".to_string()))
    }

    /// create
    ///
    /// The target restaurant must exist and belong to the caller. Both checks run
    /// before the insert so a rejected request never leaves a meal behind.
    pub async fn create(&self, req: CreateMealRequest, user: &AuthUser) -> AppResult<Meal> {
        req.validate()?;
        let restaurant_id = parse_id(&req.restaurant)?;

        let restaurant = self
            .repo
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found with this Id.".to_string()))?;
        authorize_owner(restaurant.user, user, "You can not add meal to this restaurant.")?;

        let meal = self
            .repo
            .create_meal(NewMeal {
                restaurant_id: restaurant.id,
                user_id: user.id,
                name: req.name,
                description: req.description,
                price: req.price,
                category: req.category,
            })
            .await?;

        if !self.repo.push_menu_item(restaurant.id, meal.id).await? {
            // Restaurant deleted between the check and the append.
            self.repo.delete_meal(meal.id).await?;
            return Err(AppError::NotFound(
                "Restaurant not found with this Id.".to_string(),
            ));
        }

        tracing::info!(meal_id = %meal.id, restaurant_id = %restaurant.id, "meal added to menu");
        Ok(meal)
    }

    /// update
    ///
    /// Creator only. The owning restaurant is fixed at creation.
    pub async fn update(
        &self,
        id: &str,
        req: UpdateMealRequest,
        user: &AuthUser,
    ) -> AppResult<Meal> {
        let meal = self.find_by_id(id).await?;
        authorize_owner(meal.user, user, "You can not update this meal.")?;
        req.validate()?;

        self.repo
            .update_meal(meal.id, req)
            .await?
            .ok_or_else(|| AppError::NotFound("Meal not found with this Id.".to_string()))
    }

    /// delete
    ///
    /// Creator only. The menu entry is removed before the meal record.
    pub async fn delete(&self, id: &str, user: &AuthUser) -> AppResult<DeleteResponse> {
        let meal = self.find_by_id(id).await?;
        authorize_owner(meal.user, user, "You can not delete this meal.")?;

        if !self.repo.pull_menu_item(meal.restaurant, meal.id).await? {
            tracing::warn!(meal_id = %meal.id, restaurant_id = %meal.restaurant, "owning restaurant missing");
        }

        let deleted = self.repo.delete_meal(meal.id).await?;
        Ok(DeleteResponse { deleted })
    }
}

use validator::Validate;

use crate::{
    auth::{AuthUser, authorize_owner},
    error::{AppError, AppResult},
    geocoder::GeocoderState,
    models::{
        CreateRestaurantRequest, DeleteResponse, ImageRef, Location, Restaurant,
        UpdateRestaurantRequest, UploadFile, parse_id,
    },
    pagination::{PageRequest, normalize_keyword},
    repository::{NewRestaurant, RepositoryState, RestaurantChanges},
    storage::StorageState,
};

/// RestaurantService
///
/// Restaurant CRUD with the ownership guard in front of every mutation and the
/// image bucket kept in step with the stored image list.
#[derive(Clone)]
pub struct RestaurantService {
    repo: RepositoryState,
    storage: StorageState,
    geocoder: GeocoderState,
}

impl RestaurantService {
    pub fn new(repo: RepositoryState, storage: StorageState, geocoder: GeocoderState) -> Self {
        Self {
            repo,
            storage,
            geocoder,
        }
    }

    /// find_all
    ///
    /// One page of restaurants whose name contains `keyword` (case-insensitive).
    pub async fn find_all(
        &self,
        keyword: Option<String>,
        page: PageRequest,
    ) -> AppResult<Vec<Restaurant>> {
        let keyword = normalize_keyword(keyword);
        Ok(self.repo.list_restaurants(keyword.as_deref(), page).await?)
    }

    /// find_by_id
    ///
    /// BadRequest for a malformed id, NotFound for a well-formed one with no record.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Restaurant> {
        let id = parse_id(id)?;
        self.repo
            .get_restaurant(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found.".to_string()))
    }

    pub async fn create(
        &self,
        req: CreateRestaurantRequest,
        user: &AuthUser,
    ) -> AppResult<Restaurant> {
        req.validate()?;

        let location = self.locate(&req.address).await?;
        let restaurant = self
            .repo
            .create_restaurant(NewRestaurant {
                user_id: user.id,
                details: req,
                location,
            })
            .await?;

        tracing::info!(restaurant_id = %restaurant.id, user_id = %user.id, "restaurant created");
        Ok(restaurant)
    }

    /// update
    ///
    /// Owner only. A changed address is geocoded again and its result, found or
    /// not, replaces the stored location.
    pub async fn update(
        &self,
        id: &str,
        req: UpdateRestaurantRequest,
        user: &AuthUser,
    ) -> AppResult<Restaurant> {
        let current = self.find_by_id(id).await?;
        authorize_owner(current.user, user, "You can not update this restaurant.")?;
        req.validate()?;

        // An address the provider cannot place clears the stale point.
        let location = match req.address.as_deref() {
            Some(address) if address != current.address => Some(self.locate(address).await?),
            _ => None,
        };

        self.repo
            .update_restaurant(
                current.id,
                RestaurantChanges {
                    details: req,
                    location,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found.".to_string()))
    }

    /// delete
    ///
    /// Owner only. Images go first; the record is removed only when the bucket
    /// confirmed the image delete. Otherwise nothing changes and `deleted` is false.
    pub async fn delete(&self, id: &str, user: &AuthUser) -> AppResult<DeleteResponse> {
        let restaurant = self.find_by_id(id).await?;
        authorize_owner(restaurant.user, user, "You can not delete this restaurant.")?;

        if !self.delete_images(&restaurant.images).await {
            tracing::warn!(restaurant_id = %restaurant.id, "image cleanup failed, delete aborted");
            return Ok(DeleteResponse { deleted: false });
        }

        let deleted = self.repo.delete_restaurant(restaurant.id).await?;
        if deleted {
            tracing::info!(restaurant_id = %restaurant.id, "restaurant deleted");
        }
        Ok(DeleteResponse { deleted })
    }

    /// upload_images
    ///
    /// Owner only. Replaces the image list with the freshly uploaded files, then
    /// removes the previous objects from the bucket.
    pub async fn upload_images(
        &self,
        id: &str,
        files: Vec<UploadFile>,
        user: &AuthUser,
    ) -> AppResult<Restaurant> {
        let restaurant = self.find_by_id(id).await?;
        authorize_owner(restaurant.user, user, "You can not upload images to this restaurant.")?;

        if files.is_empty() {
            return Err(AppError::BadRequest(
                "Please upload at least one image.".to_string(),
            ));
        }

        let images = self
            .storage
            .upload_images(files)
            .await
            .map_err(AppError::Storage)?;

        let Some(updated) = self
            .repo
            .set_restaurant_images(restaurant.id, images.clone())
            .await?
        else {
            // The record vanished while uploading; do not leave the new objects behind.
            self.delete_images(&images).await;
            return Err(AppError::NotFound("Restaurant not found.".to_string()));
        };

        if !self.delete_images(&restaurant.images).await {
            tracing::warn!(
                restaurant_id = %restaurant.id,
                count = restaurant.images.len(),
                "previous images could not be removed from storage"
            );
        }

        Ok(updated)
    }

    /// delete_images
    ///
    /// Empty list is a successful no-op; otherwise one bulk request.
    pub async fn delete_images(&self, images: &[ImageRef]) -> bool {
        if images.is_empty() {
            return true;
        }
        self.storage.delete_images(images).await
    }

    async fn locate(&self, address: &str) -> AppResult<Option<Location>> {
        self.geocoder
            .geocode(address)
            .await
            .map_err(AppError::Geocoding)
    }
}

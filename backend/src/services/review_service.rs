use std::sync::Arc;

use sweetshop_shared::{CreateReviewRequest, DEFAULT_REVIEWER_NAME, MAX_RATING, MIN_RATING};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::Review;
use crate::repositories::Store;

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a review and fold its rating into the sweet's aggregate
    pub async fn add_review(
        &self,
        caller: &AuthenticatedUser,
        sweet_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<Review, AppError> {
        request.validate()?;
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let username = match caller.name.trim() {
            "" => DEFAULT_REVIEWER_NAME.to_string(),
            name => name.to_string(),
        };
        let review = Review::new(
            sweet_id,
            caller.user_id,
            username,
            request.rating,
            request.comment.trim().to_string(),
        );

        let sweet = self.store.insert_review(&review).await?;

        info!(
            "Review {} on sweet {}: {} stars (now {:.2} over {})",
            review.id, sweet_id, review.rating, sweet.average_rating, sweet.review_count
        );
        Ok(review)
    }

    /// Reviews of one sweet, newest first
    pub async fn list_reviews(&self, sweet_id: Uuid) -> Result<Vec<Review>, AppError> {
        if self.store.find_sweet(sweet_id).await?.is_none() {
            return Err(AppError::NotFound("Sweet not found".to_string()));
        }
        self.store.reviews_for_sweet(sweet_id).await
    }
}

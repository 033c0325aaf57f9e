use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sweetshop_shared::{CreateSweetRequest, SweetSearchQuery, UpdatePricingRequest};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Sweet {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    /// Shown struck through next to `price` when higher.
    pub list_price: Option<Decimal>,
    pub quantity: i32,
    pub description: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub image: Option<String>,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Sweet {
    /// Build a new catalog record from an admin request
    pub fn from_request(request: CreateSweetRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            category: request.category.trim().to_string(),
            price: request.price,
            cost_price: request.cost_price,
            list_price: request.list_price,
            quantity: request.quantity,
            description: request.description,
            expiry_date: request.expiry_date,
            batch_number: request.batch_number,
            image: request.image,
            average_rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn has_stock(&self, quantity: i32) -> bool {
        self.quantity >= quantity
    }

    pub fn apply_pricing(&mut self, update: &UpdatePricingRequest) {
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(cost_price) = update.cost_price {
            self.cost_price = cost_price;
        }
        if update.list_price.is_some() {
            self.list_price = update.list_price;
        }
    }

    /// Fold one more rating into the running average
    pub fn record_rating(&mut self, rating: i16) {
        let count = f64::from(self.review_count);
        self.average_rating = (self.average_rating * count + f64::from(rating)) / (count + 1.0);
        self.review_count += 1;
    }

    /// In-process evaluation of a catalog search
    pub fn matches(&self, query: &SweetSearchQuery) -> bool {
        if let Some(needle) = search_text(query) {
            let needle = needle.to_lowercase();
            let in_name = self.name.to_lowercase().contains(&needle);
            let in_description = self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = category_filter(query) {
            if self.category != category {
                return false;
            }
        }

        if let Some(min_price) = query.min_price {
            if self.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = query.max_price {
            if self.price > max_price {
                return false;
            }
        }

        true
    }
}

/// Trimmed free-text search term, ignoring blanks
pub fn search_text(query: &SweetSearchQuery) -> Option<&str> {
    query.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
}

/// Category to filter on; `All` and blanks mean every category
pub fn category_filter(query: &SweetSearchQuery) -> Option<&str> {
    query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "All")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweet(name: &str, category: &str, price: i64) -> Sweet {
        Sweet::from_request(CreateSweetRequest {
            name: name.to_string(),
            category: category.to_string(),
            price: Decimal::from(price),
            cost_price: Decimal::ZERO,
            list_price: None,
            quantity: 10,
            description: Some("Made with pure ghee".to_string()),
            expiry_date: None,
            batch_number: None,
            image: None,
        })
    }

    #[test]
    fn test_search_matches_name_and_description_case_insensitively() {
        let laddu = sweet("Motichoor Laddu", "Laddu", 12);

        let by_name = SweetSearchQuery { query: Some("motichoor".into()), ..Default::default() };
        let by_description = SweetSearchQuery { query: Some("GHEE".into()), ..Default::default() };
        let miss = SweetSearchQuery { query: Some("barfi".into()), ..Default::default() };

        assert!(laddu.matches(&by_name));
        assert!(laddu.matches(&by_description));
        assert!(!laddu.matches(&miss));
    }

    #[test]
    fn test_category_all_matches_everything() {
        let barfi = sweet("Kaju Barfi", "Barfi", 30);
        let all = SweetSearchQuery { category: Some("All".into()), ..Default::default() };
        let other = SweetSearchQuery { category: Some("Halwa".into()), ..Default::default() };

        assert!(barfi.matches(&all));
        assert!(!barfi.matches(&other));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let barfi = sweet("Kaju Barfi", "Barfi", 30);
        let bounds = SweetSearchQuery {
            min_price: Some(Decimal::from(30)),
            max_price: Some(Decimal::from(30)),
            ..Default::default()
        };
        let too_cheap = SweetSearchQuery { max_price: Some(Decimal::from(29)), ..Default::default() };

        assert!(barfi.matches(&bounds));
        assert!(!barfi.matches(&too_cheap));
    }

    #[test]
    fn test_record_rating_keeps_running_average() {
        let mut peda = sweet("Peda", "Milk", 15);
        peda.record_rating(5);
        peda.record_rating(4);
        peda.record_rating(3);

        assert_eq!(peda.review_count, 3);
        assert!((peda.average_rating - 4.0).abs() < f64::EPSILON);
    }
}

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sweetshop_shared::{
    CreatePartnerRequest, OrderStatus, PartnerLoginRequest, ERROR_INVALID_CREDENTIALS,
    ERROR_ORDER_NOT_ASSIGNED_TO_YOU, ERROR_ORDER_NOT_IN_ASSIGNED_STATE,
    ERROR_PARTNER_FIELDS_REQUIRED, ERROR_PARTNER_TERMINATED, PARTNER_CODE_MAX_ATTEMPTS,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::order_service::resolve_order_details;
use super::NotificationService;
use crate::error::AppError;
use crate::middleware::{AuthenticatedPartner, AuthenticatedUser};
use crate::models::{DeliveryPartner, Notification, Order, OrderDetails};
use crate::repositories::Store;
use crate::utils::jwt::JwtService;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerList {
    pub partners: Vec<DeliveryPartner>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSession {
    pub token: String,
    pub partner: DeliveryPartner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerDashboard {
    pub partner: DeliveryPartner,
    pub orders: Vec<OrderDetails>,
}

/// Partner identities, partner sessions and partner-side order handling
#[derive(Clone)]
pub struct DeliveryService {
    store: Arc<dyn Store>,
    notifications: NotificationService,
    jwt_service: JwtService,
}

impl DeliveryService {
    pub fn new(
        store: Arc<dyn Store>,
        notifications: NotificationService,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            store,
            notifications,
            jwt_service,
        }
    }

    /// Register a partner under a freshly drawn unique code
    pub async fn issue_partner(
        &self,
        caller: &AuthenticatedUser,
        request: CreatePartnerRequest,
    ) -> Result<DeliveryPartner, AppError> {
        self.issue_partner_with(caller, request, &mut StdRng::from_entropy())
            .await
    }

    /// `issue_partner` drawing codes from `rng`
    pub(crate) async fn issue_partner_with<R: Rng + Send>(
        &self,
        caller: &AuthenticatedUser,
        request: CreatePartnerRequest,
        rng: &mut R,
    ) -> Result<DeliveryPartner, AppError> {
        caller.require_admin()?;

        let name = request.name.trim();
        let mobile = request.mobile.trim();
        if name.is_empty() || mobile.is_empty() {
            return Err(AppError::Validation(ERROR_PARTNER_FIELDS_REQUIRED.to_string()));
        }
        request.validate()?;

        for attempt in 1..=PARTNER_CODE_MAX_ATTEMPTS {
            let code = DeliveryPartner::generate_code(rng);
            let partner = DeliveryPartner::new(name.to_string(), mobile.to_string(), code);

            match self.store.insert_partner(&partner).await {
                Ok(()) => {
                    info!("Delivery partner {} issued code {}", partner.id, partner.code);
                    return Ok(partner);
                }
                Err(AppError::Conflict(_)) => {
                    warn!(
                        "Partner code {} already taken (attempt {}/{})",
                        partner.code, attempt, PARTNER_CODE_MAX_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique partner code".to_string(),
        ))
    }

    pub async fn list_partners(&self, caller: &AuthenticatedUser) -> Result<PartnerList, AppError> {
        caller.require_admin()?;
        let partners = self.store.list_partners().await?;
        Ok(PartnerList {
            count: partners.len(),
            partners,
        })
    }

    /// Soft-delete: the record stays but can no longer log in
    pub async fn terminate_partner(
        &self,
        caller: &AuthenticatedUser,
        partner_id: Uuid,
    ) -> Result<DeliveryPartner, AppError> {
        caller.require_admin()?;
        let partner = self
            .store
            .terminate_partner(partner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery Partner not found".to_string()))?;

        info!("Delivery partner {} terminated by {}", partner_id, caller.user_id);
        Ok(partner)
    }

    pub async fn login(&self, request: PartnerLoginRequest) -> Result<PartnerSession, AppError> {
        let partner = self
            .store
            .find_partner_by_credentials(&request.name, &request.code)
            .await?
            .ok_or_else(|| AppError::InvalidCredentials(ERROR_INVALID_CREDENTIALS.to_string()))?;

        if !partner.is_active() {
            warn!("Terminated partner {} attempted to log in", partner.id);
            return Err(AppError::Terminated(ERROR_PARTNER_TERMINATED.to_string()));
        }

        let token = self
            .jwt_service
            .issue_partner_token(partner.id, partner.name.clone())?;

        info!("Delivery partner {} logged in", partner.id);
        Ok(PartnerSession { token, partner })
    }

    /// The partner's profile and every order assigned to them, newest first
    pub async fn dashboard(&self, session: &AuthenticatedPartner) -> Result<PartnerDashboard, AppError> {
        let partner = self.active_partner(session).await?;
        let orders = self.store.orders_for_partner(partner.id).await?;
        let orders = resolve_order_details(self.store.as_ref(), orders).await?;
        Ok(PartnerDashboard { partner, orders })
    }

    /// Ship an order that was assigned to this partner
    pub async fn accept_order(
        &self,
        session: &AuthenticatedPartner,
        order_id: Uuid,
    ) -> Result<Order, AppError> {
        let partner = self.active_partner(session).await?;

        let order = self
            .store
            .find_order(order_id)
            .await?
            .filter(|order| order.delivery_partner_id == Some(partner.id))
            .ok_or_else(|| AppError::NotFound(ERROR_ORDER_NOT_ASSIGNED_TO_YOU.to_string()))?;

        if order.status != OrderStatus::Assigned {
            return Err(AppError::InvalidState(
                ERROR_ORDER_NOT_IN_ASSIGNED_STATE.to_string(),
            ));
        }

        let shipped = self
            .store
            .update_status(order.id, OrderStatus::Assigned, OrderStatus::Shipped, None)
            .await?
            .ok_or_else(|| AppError::InvalidState(ERROR_ORDER_NOT_IN_ASSIGNED_STATE.to_string()))?;

        info!("Order {} accepted and shipped by partner {}", order.id, partner.id);

        self.notifications
            .notify(
                shipped.user_id,
                Notification::shipped_by_partner_message(&shipped, &partner.name),
            )
            .await;

        Ok(shipped)
    }

    /// Resolve the session's partner record, refusing terminated partners
    async fn active_partner(&self, session: &AuthenticatedPartner) -> Result<DeliveryPartner, AppError> {
        let partner = self
            .store
            .find_partner(session.partner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Partner not found".to_string()))?;

        if !partner.is_active() {
            return Err(AppError::Terminated(ERROR_PARTNER_TERMINATED.to_string()));
        }
        Ok(partner)
    }
}

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::orders::InsertOrderEntity,
    repositories::{
        discount_codes::DiscountCodeRepository, geocoding::GeocodingClient,
        gift_cards::GiftCardRepository, messaging::MessagingGateway, orders::OrderRepository,
        products::ProductRepository, profiles::ProfileRepository,
        store_settings::StoreSettingsRepository,
    },
    value_objects::{
        delivery_zone::Coordinates,
        discount_codes::AppliedDiscount,
        enums::delivery_types::DeliveryType,
        gift_cards::GiftCardRedemption,
        order_notifications::OrderNotification,
        orders::{
            CreateOrderRequest, CreateOrderResponse, DiscountCodeRedemption, MAX_ITEM_QUANTITY,
            OrderDto, OrderLine, PlaceOrderModel, price_order,
        },
        phone_numbers::normalize_phone,
        products::ProductDto,
        redemptions::RedemptionConflict,
    },
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::usecases::{
    coupons::{CouponError, CouponUseCase},
    estimates::EstimateUseCase,
    geocoding::{GeocodingUseCase, ZoneCheck, ZoneError},
    gift_cards::{GiftCardError, GiftCardUseCase},
    notifications::OrderNotifier,
};

const ORDER_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,
    #[error("quantity must be between 1 and {MAX_ITEM_QUANTITY}")]
    InvalidQuantity,
    #[error("customer name is required")]
    MissingName,
    #[error("customer phone is invalid")]
    InvalidPhone,
    #[error("delivery orders need an address")]
    AddressRequired,
    #[error("the store is closed")]
    StoreClosed,
    #[error("product {0} does not exist")]
    ProductNotFound(Uuid),
    #[error("{0} is not available right now")]
    ProductUnavailable(String),
    #[error("{product} has no extra named {extra}")]
    UnknownExtra { product: String, extra: String },
    #[error(transparent)]
    OutsideZone(#[from] ZoneError),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error(transparent)]
    GiftCard(#[from] GiftCardError),
    #[error(transparent)]
    Conflict(RedemptionConflict),
    #[error("order not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity
            | OrderError::MissingName
            | OrderError::InvalidPhone
            | OrderError::AddressRequired => StatusCode::BAD_REQUEST,
            OrderError::StoreClosed
            | OrderError::ProductNotFound(_)
            | OrderError::ProductUnavailable(_)
            | OrderError::UnknownExtra { .. }
            | OrderError::OutsideZone(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OrderError::Coupon(err) => err.status_code(),
            OrderError::GiftCard(err) => err.status_code(),
            OrderError::Conflict(_) => StatusCode::CONFLICT,
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, OrderError>;

/// Request fields that survived validation.
struct ValidatedOrder {
    customer_name: String,
    customer_phone: String,
    address: Option<String>,
    notes: Option<String>,
}

fn validate_request(
    request: &CreateOrderRequest,
    default_country_code: &str,
) -> UseCaseResult<ValidatedOrder> {
    if request.items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    if request
        .items
        .iter()
        .any(|item| !(1..=MAX_ITEM_QUANTITY).contains(&item.quantity))
    {
        return Err(OrderError::InvalidQuantity);
    }

    let customer_name = request.customer_name.trim();
    if customer_name.is_empty() {
        return Err(OrderError::MissingName);
    }
    let customer_phone = normalize_phone(&request.customer_phone, default_country_code)
        .ok_or(OrderError::InvalidPhone)?;

    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string);
    if request.delivery_type == DeliveryType::Delivery && address.is_none() {
        return Err(OrderError::AddressRequired);
    }

    Ok(ValidatedOrder {
        customer_name: customer_name.to_string(),
        customer_phone,
        address,
        notes: request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string),
    })
}

/// Prices come from the catalog, never from the request.
fn resolve_lines(
    request: &CreateOrderRequest,
    products: &HashMap<Uuid, ProductDto>,
) -> UseCaseResult<Vec<OrderLine>> {
    request
        .items
        .iter()
        .map(|item| {
            let product = products
                .get(&item.product_id)
                .ok_or(OrderError::ProductNotFound(item.product_id))?;
            if !product.available {
                return Err(OrderError::ProductUnavailable(product.name.clone()));
            }

            let extras = item
                .extras
                .iter()
                .map(|name| {
                    product
                        .find_extra(name)
                        .cloned()
                        .ok_or_else(|| OrderError::UnknownExtra {
                            product: product.name.clone(),
                            extra: name.clone(),
                        })
                })
                .collect::<UseCaseResult<Vec<_>>>()?;

            Ok(OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price_minor: product.price_minor,
                quantity: item.quantity,
                extras,
            })
        })
        .collect()
}

fn request_coordinates(request: &CreateOrderRequest) -> Option<Coordinates> {
    match (request.latitude, request.longitude) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }).filter(Coordinates::is_valid),
        _ => None,
    }
}

/// Collaborators the checkout needs besides its own repositories.
pub struct CheckoutServices<D, F, G, S, C, M>
where
    D: DiscountCodeRepository + Send + Sync + 'static,
    F: ProfileRepository + Send + Sync + 'static,
    G: GiftCardRepository + Send + Sync + 'static,
    S: StoreSettingsRepository + Send + Sync + 'static,
    C: GeocodingClient + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    pub coupons: Arc<CouponUseCase<D, F>>,
    pub gift_cards: Arc<GiftCardUseCase<G>>,
    pub estimates: Arc<EstimateUseCase<S>>,
    pub geocoding: Arc<GeocodingUseCase<C>>,
    pub notifier: Arc<OrderNotifier<M>>,
}

pub struct OrderUseCase<P, O, D, F, G, S, C, M>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DiscountCodeRepository + Send + Sync + 'static,
    F: ProfileRepository + Send + Sync + 'static,
    G: GiftCardRepository + Send + Sync + 'static,
    S: StoreSettingsRepository + Send + Sync + 'static,
    C: GeocodingClient + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    product_repository: Arc<P>,
    order_repository: Arc<O>,
    services: CheckoutServices<D, F, G, S, C, M>,
    delivery_fee_minor: i64,
    default_country_code: String,
}

impl<P, O, D, F, G, S, C, M> OrderUseCase<P, O, D, F, G, S, C, M>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DiscountCodeRepository + Send + Sync + 'static,
    F: ProfileRepository + Send + Sync + 'static,
    G: GiftCardRepository + Send + Sync + 'static,
    S: StoreSettingsRepository + Send + Sync + 'static,
    C: GeocodingClient + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    pub fn new(
        product_repository: Arc<P>,
        order_repository: Arc<O>,
        services: CheckoutServices<D, F, G, S, C, M>,
        delivery_fee_minor: i64,
        default_country_code: String,
    ) -> Self {
        Self {
            product_repository,
            order_repository,
            services,
            delivery_fee_minor,
            default_country_code,
        }
    }

    pub async fn place_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CreateOrderResponse> {
        let validated = validate_request(&request, &self.default_country_code)?;

        let estimate = self
            .services
            .estimates
            .estimate(request.delivery_type, now)
            .await;
        if !estimate.open {
            return Err(OrderError::StoreClosed);
        }

        let mut product_ids: Vec<Uuid> = request.items.iter().map(|item| item.product_id).collect();
        product_ids.sort();
        product_ids.dedup();
        let products: HashMap<Uuid, ProductDto> = self
            .product_repository
            .find_by_ids(product_ids)
            .await?
            .into_iter()
            .map(|entity| (entity.id, ProductDto::from(entity)))
            .collect();
        let lines = resolve_lines(&request, &products)?;

        let mut coordinates = request_coordinates(&request);
        if request.delivery_type == DeliveryType::Delivery {
            let address = validated.address.as_deref().unwrap_or_default();
            if let ZoneCheck::Inside(point) = self
                .services
                .geocoding
                .check_delivery_address(address, coordinates)
                .await?
            {
                coordinates = Some(point);
            }
        }

        let subtotal_minor: i64 = lines.iter().map(OrderLine::line_total_minor).sum();
        let discount = self
            .resolve_discount(user_id, request.discount_code.as_deref(), subtotal_minor, now)
            .await?;

        let gift_card = match request
            .gift_card_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
        {
            Some(code) => Some(self.services.gift_cards.usable_card(user_id, code).await?),
            None => None,
        };

        let delivery_fee_minor = match request.delivery_type {
            DeliveryType::Delivery => self.delivery_fee_minor,
            DeliveryType::Retiro => 0,
        };
        let pricing = price_order(
            &lines,
            discount.amount(subtotal_minor),
            delivery_fee_minor,
            gift_card.as_ref().map(|card| card.amount_remaining_minor),
        );

        let items = serde_json::to_value(&lines).map_err(anyhow::Error::from)?;
        let discount_code = match &discount {
            AppliedDiscount::Code {
                discount_code_id, ..
            } => Some(DiscountCodeRedemption {
                discount_code_id: *discount_code_id,
                user_id,
            }),
            _ => None,
        };
        let birthday_year = match &discount {
            AppliedDiscount::Birthday { year, .. } => Some(*year),
            _ => None,
        };
        let gift_card_redemption = gift_card
            .as_ref()
            .filter(|_| pricing.gift_card_minor > 0)
            .map(|card| GiftCardRedemption {
                gift_card_id: card.id,
                user_id,
                amount_minor: pricing.gift_card_minor,
            });

        let model = PlaceOrderModel {
            order: InsertOrderEntity {
                id: Uuid::new_v4(),
                user_id,
                customer_name: validated.customer_name.clone(),
                customer_phone: validated.customer_phone.clone(),
                items,
                subtotal_minor: pricing.subtotal_minor,
                discount_minor: pricing.discount_minor,
                delivery_fee_minor: pricing.delivery_fee_minor,
                gift_card_minor: pricing.gift_card_minor,
                total_minor: pricing.total_minor,
                delivery_type: request.delivery_type.to_string(),
                address: validated.address.clone(),
                latitude: coordinates.map(|point| point.lat),
                longitude: coordinates.map(|point| point.lng),
                payment_method: request.payment_method.to_string(),
                discount_code_id: discount_code.as_ref().map(|code| code.discount_code_id),
                gift_card_id: gift_card_redemption.as_ref().map(|card| card.gift_card_id),
                notes: validated.notes.clone(),
                created_at: now,
            },
            discount_code,
            gift_card: gift_card_redemption,
            birthday_year,
        };

        let order_id = self
            .order_repository
            .place_order(model)
            .await
            .map_err(|err| match err.downcast::<RedemptionConflict>() {
                Ok(conflict) => {
                    warn!(%user_id, %conflict, "orders: redemption conflict, order rolled back");
                    OrderError::Conflict(conflict)
                }
                Err(err) => OrderError::Internal(err),
            })?;

        info!(
            %user_id,
            %order_id,
            total_minor = pricing.total_minor,
            delivery_type = %request.delivery_type,
            "orders: order placed"
        );

        // The handles are dropped; delivery outcome never affects the response.
        self.services.notifier.dispatch(OrderNotification {
            order_id,
            customer_name: validated.customer_name,
            customer_phone: validated.customer_phone,
            delivery_type: request.delivery_type,
            address: validated.address,
            eta_text: estimate.eta_text.clone(),
            lines,
            total_minor: pricing.total_minor,
            payment_method: request.payment_method,
            notes: validated.notes,
        });

        Ok(CreateOrderResponse {
            order_id,
            pricing,
            total_minor: pricing.total_minor,
            eta_text: estimate.eta_text,
        })
    }

    /// A typed coupon wins over the birthday discount; they never stack.
    async fn resolve_discount(
        &self,
        user_id: Uuid,
        raw_code: Option<&str>,
        subtotal_minor: i64,
        now: DateTime<Utc>,
    ) -> UseCaseResult<AppliedDiscount> {
        if let Some(raw_code) = raw_code.filter(|code| !code.trim().is_empty()) {
            let redeemable = self
                .services
                .coupons
                .redeemable_code(user_id, raw_code, subtotal_minor, now)
                .await?;
            return Ok(AppliedDiscount::Code {
                discount_code_id: redeemable.discount_code_id,
                quote: redeemable.quote,
            });
        }

        Ok(
            match self.services.coupons.birthday_discount(user_id, now).await? {
                Some(birthday) => AppliedDiscount::Birthday {
                    percent: birthday.percent,
                    year: birthday.year,
                },
                None => AppliedDiscount::None,
            },
        )
    }

    pub async fn list_orders(&self, user_id: Uuid) -> UseCaseResult<Vec<OrderDto>> {
        let orders = self
            .order_repository
            .list_orders_for_user(user_id, ORDER_HISTORY_LIMIT)
            .await?;
        Ok(orders.into_iter().map(OrderDto::from).collect())
    }

    pub async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> UseCaseResult<OrderDto> {
        self.order_repository
            .find_order_for_user(order_id, user_id)
            .await?
            .map(OrderDto::from)
            .ok_or(OrderError::NotFound)
    }
}

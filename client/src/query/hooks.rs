//! Cached reads and invalidating mutations over the service layer.
//!
//! Reads that need a session return `Ok(None)` while logged out instead of
//! issuing a request. Mutations report their outcome through the
//! [`Notifier`] and invalidate the queries they make stale.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{keys, QueryCache, QueryKey};
use crate::api::ApiClient;
use crate::config::Config;
use crate::models::user::{PasswordChange, ProfileUpdate, RegisterRequest};
use crate::models::{
    Attendee, CheckInResult, Event, EventFilter, EventInput, HostAnalytics, NewReview,
    OrderRequest, PaymentInit, PaymentVerification, Payout, PayoutAccount, Review, Ticket, User,
};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::services;
use crate::store::TokenStore;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::parse_event_id;

#[derive(Clone)]
pub struct Rave {
    pub(super) client: ApiClient,
    pub(super) cache: QueryCache,
    pub(super) notifier: Arc<dyn Notifier>,
    /// One lock per event with a wishlist toggle in progress.
    pub(super) toggles: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl Rave {
    pub fn new(client: ApiClient, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            cache,
            notifier,
            toggles: Arc::default(),
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built
    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let client = ApiClient::new(config, tokens)?;
        Ok(Self::new(
            client,
            QueryCache::new(config.cache_stale_time),
            Arc::new(TracingNotifier),
        ))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    pub(crate) fn notify_error(&self, err: &ApiError) {
        self.notifier.notify(Notice::error(err.message()));
    }

    pub(crate) fn notify_success(&self, message: &str) {
        self.notifier.notify(Notice::success(message));
    }

    /// A 401 anywhere means the session is gone: private cached data goes too.
    fn observe<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                info!("Session rejected by the server; clearing cached queries");
                self.cache.clear();
            }
        }
        result
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let result = self.cache.fetch(&key, fetcher).await;
        self.observe(result)
    }

    /// Like [`Self::query`], but disabled (`Ok(None)`) without a session.
    async fn authed_query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if !self.is_authenticated() {
            return Ok(None);
        }
        self.query(key, fetcher).await.map(Some)
    }

    /// Common tail of every mutation: notify, invalidate, pass the result on.
    pub(crate) fn settle<T>(
        &self,
        result: ApiResult<T>,
        success: &str,
        invalidate: &[QueryKey],
    ) -> ApiResult<T> {
        match self.observe(result) {
            Ok(value) => {
                for key in invalidate {
                    self.cache.invalidate(key);
                }
                self.notify_success(success);
                Ok(value)
            }
            Err(err) => {
                self.notify_error(&err);
                Err(err)
            }
        }
    }

    // Session

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let result = services::auth::login(&self.client, email, password).await;
        let user = self.settle(result, "Welcome back!", &[])?;
        self.cache.clear();
        self.cache.set(&keys::me(), &user);
        Ok(user)
    }

    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        let result = services::auth::register(&self.client, request).await;
        let user = self.settle(result, "Account created", &[])?;
        self.cache.clear();
        self.cache.set(&keys::me(), &user);
        Ok(user)
    }

    pub async fn logout(&self) {
        services::auth::logout(&self.client).await;
        self.cache.clear();
        self.notify_success("Logged out");
    }

    pub async fn me(&self) -> ApiResult<Option<User>> {
        self.authed_query(keys::me(), || services::auth::current_user(&self.client))
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        let result = services::auth::update_profile(&self.client, update).await;
        let user = self.settle(result, "Profile updated", &[])?;
        self.cache.set(&keys::me(), &user);
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        let result = services::auth::change_password(&self.client, change).await;
        self.settle(result, "Password changed", &[])
    }

    /// Requests a password reset email. The server answers the same whether
    /// or not the address has an account.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        let result = services::auth::forgot_password(&self.client, email).await;
        self.settle(
            result,
            "If that email has an account, a reset link is on its way",
            &[],
        )
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<()> {
        let result = services::auth::reset_password(&self.client, token, new_password).await;
        self.settle(result, "Password reset. You can now log in", &[])
    }

    pub async fn delete_account(&self) -> ApiResult<()> {
        let result = services::auth::delete_account(&self.client).await;
        self.settle(result, "Account deleted", &[])?;
        self.cache.clear();
        Ok(())
    }

    // Events

    pub async fn events(&self, filter: &EventFilter) -> ApiResult<Vec<Event>> {
        self.query(keys::event_list(filter), || {
            services::events::list(&self.client, filter)
        })
        .await
    }

    pub async fn event(&self, id: Uuid) -> ApiResult<Event> {
        self.query(keys::event(id), || services::events::get(&self.client, id))
            .await
    }

    pub async fn hosted_events(&self) -> ApiResult<Option<Vec<Event>>> {
        self.authed_query(keys::hosted_events(), || {
            services::events::hosted(&self.client)
        })
        .await
    }

    pub async fn create_event(&self, input: &EventInput) -> ApiResult<Event> {
        let result = services::events::create(&self.client, input).await;
        let event = self.settle(result, "Event saved", &[keys::events(), keys::host()])?;
        self.cache.set(&keys::event(event.id), &event);
        Ok(event)
    }

    pub async fn update_event(&self, id: Uuid, input: &EventInput) -> ApiResult<Event> {
        let result = services::events::update(&self.client, id, input).await;
        let event = self.settle(result, "Event updated", &[keys::events(), keys::host()])?;
        self.cache.set(&keys::event(event.id), &event);
        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid) -> ApiResult<()> {
        let result = services::events::delete(&self.client, id).await;
        self.settle(result, "Event deleted", &[keys::events(), keys::host(), keys::wishlist()])
    }

    pub async fn cancel_event(&self, id: Uuid) -> ApiResult<Event> {
        let result = services::events::cancel(&self.client, id).await;
        self.settle(result, "Event cancelled", &[keys::events(), keys::host()])
    }

    pub async fn upload_banner(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<String> {
        let result = services::events::upload_image(&self.client, file_name, mime_type, bytes).await;
        self.settle(result, "Image uploaded", &[])
    }

    // Tickets

    pub async fn my_tickets(&self) -> ApiResult<Option<Vec<Ticket>>> {
        self.authed_query(keys::tickets(), || services::tickets::mine(&self.client))
            .await
    }

    pub async fn ticket(&self, id: Uuid) -> ApiResult<Option<Ticket>> {
        self.authed_query(keys::ticket(id), || services::tickets::get(&self.client, id))
            .await
    }

    pub async fn rsvp(&self, order: &OrderRequest) -> ApiResult<Vec<Ticket>> {
        let result = services::tickets::rsvp(&self.client, order).await;
        self.settle(
            result,
            "You're on the list!",
            &[keys::tickets(), keys::event(order.event_id)],
        )
    }

    pub async fn initialize_payment(&self, order: &OrderRequest) -> ApiResult<PaymentInit> {
        let result = services::tickets::initialize_payment(&self.client, order).await;
        match self.observe(result) {
            Ok(init) => Ok(init),
            Err(err) => {
                self.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Asks the server whether the gateway actually settled `reference`.
    pub async fn verify_payment(&self, reference: &str) -> ApiResult<PaymentVerification> {
        let result = services::tickets::verify_payment(&self.client, reference).await;
        match self.observe(result) {
            Ok(verification) => Ok(verification),
            Err(err) => {
                self.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Called once the gateway reports success; the tickets themselves are
    /// issued server-side, so this only refreshes what the client shows.
    pub fn payment_completed(&self, event_id: Uuid) {
        self.cache.invalidate(&keys::tickets());
        self.cache.invalidate(&keys::event(event_id));
        self.notify_success("Payment successful! Your tickets are on the way");
    }

    // Wishlist (toggle lives in `wishlist.rs`)

    pub async fn wishlist(&self) -> ApiResult<Option<Vec<Event>>> {
        self.authed_query(keys::wishlist_events(), || {
            services::wishlist::list(&self.client)
        })
        .await
    }

    pub async fn is_wishlisted(&self, event_id: &str) -> ApiResult<Option<bool>> {
        let id = parse_event_id(event_id)?;
        self.authed_query(keys::wishlist_status(id), || {
            services::wishlist::status(&self.client, event_id)
        })
        .await
    }

    // Reviews

    pub async fn reviews(&self, event_id: &str) -> ApiResult<Vec<Review>> {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(err) => {
                self.notify_error(&err);
                return Err(err);
            }
        };
        self.query(keys::reviews(id), || {
            services::reviews::for_event(&self.client, event_id)
        })
        .await
    }

    pub async fn create_review(&self, event_id: &str, review: &NewReview) -> ApiResult<Review> {
        let result = services::reviews::create(&self.client, event_id, review).await;
        let invalidate: Vec<QueryKey> = match parse_event_id(event_id) {
            Ok(id) => vec![keys::reviews(id), keys::event(id)],
            Err(_) => Vec::new(),
        };
        self.settle(result, "Thanks for your review!", &invalidate)
    }

    pub async fn mark_review_helpful(&self, event_id: Uuid, review_id: Uuid) -> ApiResult<Review> {
        let result = services::reviews::mark_helpful(&self.client, review_id).await;
        self.settle(result, "Marked as helpful", &[keys::reviews(event_id)])
    }

    pub async fn delete_review(&self, event_id: Uuid, review_id: Uuid) -> ApiResult<()> {
        let result = services::reviews::delete(&self.client, review_id).await;
        self.settle(result, "Review deleted", &[keys::reviews(event_id)])
    }

    // Host dashboard

    pub async fn host_analytics(&self) -> ApiResult<Option<HostAnalytics>> {
        self.authed_query(keys::host_analytics(), || {
            services::host::analytics(&self.client)
        })
        .await
    }

    pub async fn attendees(&self, event_id: Uuid) -> ApiResult<Option<Vec<Attendee>>> {
        self.authed_query(keys::attendees(event_id), || {
            services::host::attendees(&self.client, event_id)
        })
        .await
    }

    pub async fn check_in(&self, qr_code: &str) -> ApiResult<CheckInResult> {
        let result = services::host::check_in(&self.client, qr_code).await;
        let message = match &result {
            Ok(r) if r.already_checked_in => format!("{} was already checked in", r.attendee.name),
            Ok(r) => format!("{} checked in", r.attendee.name),
            Err(_) => String::new(),
        };
        self.settle(result, &message, &[keys::host()])
    }

    pub async fn payouts(&self) -> ApiResult<Option<Vec<Payout>>> {
        self.authed_query(keys::payouts(), || services::host::payouts(&self.client))
            .await
    }

    pub async fn payout_account(&self) -> ApiResult<Option<Option<PayoutAccount>>> {
        self.authed_query(keys::payout_account(), || {
            services::host::payout_account(&self.client)
        })
        .await
    }

    pub async fn update_payout_account(&self, account: &PayoutAccount) -> ApiResult<PayoutAccount> {
        let result = services::host::update_payout_account(&self.client, account).await;
        let saved = self.settle(result, "Payout account saved", &[])?;
        self.cache.set(&keys::payout_account(), &Some(saved.clone()));
        Ok(saved)
    }
}

//! # Event create/edit wizard
//!
//! Four steps, `Edit → Banner → Ticketing → Review`. Moving forward runs the
//! current step's checks; moving back never does. Saving a draft skips every
//! check, publishing runs all of them and lands the wizard on the first step
//! that fails.

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use super::{to_api_error, FieldError};
use crate::models::event::combine;
use crate::models::{Event, EventInput, EventStatus, Location, TicketTypeInput};
use crate::query::Rave;
use crate::services::GeocodeResult;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventStep {
    Edit,
    Banner,
    Ticketing,
    Review,
}

impl EventStep {
    pub const ALL: [EventStep; 4] = [
        EventStep::Edit,
        EventStep::Banner,
        EventStep::Ticketing,
        EventStep::Review,
    ];

    pub fn next(self) -> Self {
        match self {
            EventStep::Edit => EventStep::Banner,
            EventStep::Banner => EventStep::Ticketing,
            EventStep::Ticketing | EventStep::Review => EventStep::Review,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EventStep::Edit | EventStep::Banner => EventStep::Edit,
            EventStep::Ticketing => EventStep::Banner,
            EventStep::Review => EventStep::Ticketing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketTypeDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub total_quantity: u32,
    /// Already sold; only non-zero when editing a live event.
    pub sold_quantity: u32,
}

impl Default for TicketTypeDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            price: Decimal::ZERO,
            description: String::new(),
            total_quantity: 1,
            sold_quantity: 0,
        }
    }
}

impl TicketTypeDraft {
    pub fn new(name: impl Into<String>, price: Decimal, total_quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            total_quantity,
            ..Self::default()
        }
    }

    fn to_input(&self) -> TicketTypeInput {
        TicketTypeInput {
            id: self.id,
            name: self.name.trim().to_string(),
            price: self.price,
            description: (!is_blank(&self.description)).then(|| self.description.trim().to_string()),
            total_quantity: self.total_quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub location_address: String,
    pub location_description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub banner_url: Option<String>,
    pub tags: Vec<String>,
    pub ticket_types: Vec<TicketTypeDraft>,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: event.start_date.clone(),
            start_time: event.start_time.clone(),
            end_date: event.end_date.clone().unwrap_or_default(),
            end_time: event.end_time.clone().unwrap_or_default(),
            location_address: event.location.address.clone(),
            location_description: event.location.description.clone(),
            latitude: event.location.latitude,
            longitude: event.location.longitude,
            banner_url: event.banner_url.clone(),
            tags: event.tags.clone(),
            ticket_types: event
                .ticket_types
                .iter()
                .map(|t| TicketTypeDraft {
                    id: Some(t.id),
                    name: t.name.clone(),
                    price: t.price,
                    description: t.description.clone().unwrap_or_default(),
                    total_quantity: t.total_quantity,
                    sold_quantity: t.sold_quantity,
                })
                .collect(),
        }
    }

    /// Takes address and coordinates from a geocoder pick.
    pub fn set_location(&mut self, place: &GeocodeResult) {
        self.location_address = place.display_name.clone();
        self.latitude = Some(place.latitude);
        self.longitude = Some(place.longitude);
    }

    pub fn to_input(&self, status: EventStatus) -> EventInput {
        let optional = |value: &str| (!is_blank(value)).then(|| value.trim().to_string());
        EventInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            start_time: self.start_time.trim().to_string(),
            end_date: optional(&self.end_date),
            end_time: optional(&self.end_time),
            location: Location {
                address: self.location_address.trim().to_string(),
                description: self.location_description.trim().to_string(),
                latitude: self.latitude,
                longitude: self.longitude,
            },
            banner_url: self.banner_url.clone(),
            tags: self
                .tags
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            status,
            ticket_types: self.ticket_types.iter().map(TicketTypeDraft::to_input).collect(),
        }
    }

    pub fn validate_step(&self, step: EventStep) -> Vec<FieldError> {
        match step {
            EventStep::Edit => self.validate_details(),
            EventStep::Banner | EventStep::Review => Vec::new(),
            EventStep::Ticketing => self.validate_ticketing(),
        }
    }

    fn validate_details(&self) -> Vec<FieldError> {
        let required = [
            ("title", &self.title, "Title is required"),
            ("startDate", &self.start_date, "Start date is required"),
            ("startTime", &self.start_time, "Start time is required"),
            ("locationAddress", &self.location_address, "Location address is required"),
            (
                "locationDescription",
                &self.location_description,
                "Location description is required",
            ),
            ("description", &self.description, "Description is required"),
        ];
        let mut errors: Vec<FieldError> = required
            .iter()
            .filter(|(_, value, _)| is_blank(value))
            .map(|(field, _, message)| FieldError::new(*field, *message))
            .collect();

        if errors.is_empty() && !is_blank(&self.end_time) {
            let normalized = self.to_input(EventStatus::Draft);
            let start = combine(&normalized.start_date, &normalized.start_time);
            let end = combine(
                normalized.end_date.as_deref().unwrap_or(&normalized.start_date),
                normalized.end_time.as_deref().unwrap_or_default(),
            );
            if let (Some(start), Some(end)) = (start, end) {
                if end <= start {
                    errors.push(FieldError::new("endTime", "Event must end after it starts"));
                }
            }
        }
        errors
    }

    fn validate_ticketing(&self) -> Vec<FieldError> {
        if self.ticket_types.is_empty() {
            return vec![FieldError::new(
                "ticketTypes",
                "Add at least one ticket type",
            )];
        }
        let mut errors = Vec::new();
        for (i, ticket) in self.ticket_types.iter().enumerate() {
            let field = |name: &str| format!("ticketTypes[{}].{}", i, name);
            if is_blank(&ticket.name) {
                errors.push(FieldError::new(field("name"), "Ticket name is required"));
            }
            if ticket.price < Decimal::ZERO {
                errors.push(FieldError::new(field("price"), "Price cannot be negative"));
            }
            if ticket.total_quantity == 0 {
                errors.push(FieldError::new(
                    field("totalQuantity"),
                    "Quantity must be at least 1",
                ));
            } else if ticket.total_quantity < ticket.sold_quantity {
                errors.push(FieldError::new(
                    field("totalQuantity"),
                    format!(
                        "Quantity cannot be lower than the {} already sold",
                        ticket.sold_quantity
                    ),
                ));
            }
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct EventWizard {
    step: EventStep,
    form: EventForm,
    /// Set once the event exists server-side (edit mode, or after a first
    /// draft save); later saves update it instead of creating another.
    event_id: Option<Uuid>,
    status: EventStatus,
    errors: Vec<FieldError>,
}

impl Default for EventWizard {
    fn default() -> Self {
        Self::create()
    }
}

impl EventWizard {
    pub fn create() -> Self {
        Self {
            step: EventStep::Edit,
            form: EventForm::default(),
            event_id: None,
            status: EventStatus::Draft,
            errors: Vec::new(),
        }
    }

    pub fn edit(event: &Event) -> Self {
        Self {
            step: EventStep::Edit,
            form: EventForm::from_event(event),
            event_id: Some(event.id),
            status: event.status,
            errors: Vec::new(),
        }
    }

    pub fn step(&self) -> EventStep {
        self.step
    }

    pub fn form(&self) -> &EventForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EventForm {
        &mut self.form
    }

    pub fn event_id(&self) -> Option<Uuid> {
        self.event_id
    }

    pub fn is_editing(&self) -> bool {
        self.event_id.is_some()
    }

    /// Field errors from the last failed advance or publish.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Advances if the current step is valid; otherwise stays and returns
    /// the failing fields.
    pub fn next(&mut self) -> Result<EventStep, Vec<FieldError>> {
        let errors = self.form.validate_step(self.step);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors.clear();
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> EventStep {
        self.errors.clear();
        self.step = self.step.prev();
        self.step
    }

    /// Validates every step, stopping the wizard at the first failing one.
    pub fn validate_all(&mut self) -> Result<(), Vec<FieldError>> {
        for step in EventStep::ALL {
            let errors = self.form.validate_step(step);
            if !errors.is_empty() {
                self.step = step;
                self.errors = errors.clone();
                return Err(errors);
            }
        }
        self.errors.clear();
        Ok(())
    }

    /// Uploads a banner and attaches its URL to the form.
    pub async fn upload_banner(
        &mut self,
        rave: &Rave,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<String> {
        let url = rave.upload_banner(file_name, mime_type, bytes).await?;
        self.form.banner_url = Some(url.clone());
        Ok(url)
    }

    /// Saves as a draft without any validation. Keeps the current step.
    ///
    /// Only events that are not live yet can be saved this way; a published
    /// event goes through [`Self::save`] so its fields stay validated.
    pub async fn save_draft(&mut self, rave: &Rave) -> ApiResult<Event> {
        if self.is_editing() && self.status != EventStatus::Draft {
            let err = ApiError::validation(
                "Published events cannot be saved as drafts; save the event instead",
            );
            rave.notify_error(&err);
            return Err(err);
        }
        self.submit(rave, EventStatus::Draft).await
    }

    /// Saves an existing event after validating every step. Same as
    /// [`Self::publish`]; a draft being saved this way goes live.
    pub async fn save(&mut self, rave: &Rave) -> ApiResult<Event> {
        self.publish(rave).await
    }

    /// Validates everything and publishes (create) or saves (edit). A draft
    /// being saved this way goes live.
    pub async fn publish(&mut self, rave: &Rave) -> ApiResult<Event> {
        if let Err(errors) = self.validate_all() {
            let err = to_api_error(&errors);
            rave.notify_error(&err);
            return Err(err);
        }
        let status = match self.status {
            EventStatus::Draft => EventStatus::Active,
            other => other,
        };
        self.submit(rave, status).await
    }

    async fn submit(&mut self, rave: &Rave, status: EventStatus) -> ApiResult<Event> {
        let input = self.form.to_input(status);
        debug!(event_id = ?self.event_id, ?status, step = ?self.step, "Submitting event form");

        let event = match self.event_id {
            Some(id) => rave.update_event(id, &input).await?,
            None => rave.create_event(&input).await?,
        };
        self.event_id = Some(event.id);
        self.status = event.status;
        Ok(event)
    }
}

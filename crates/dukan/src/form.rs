//! Delivery-details form validation.
//!
//! Field rules match the storefront UI: errors stay hidden until a field
//! is first touched (blur), then re-validate live on every change. A
//! submission attempt touches everything and reports the first invalid
//! field so the caller can scroll to it. The city rule here is the single
//! source of truth also used by the shipping calculator.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::order::CustomerDetails;

static LETTERS_AND_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("static regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("static regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// Checkout form fields, in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Customer full name
    Name,
    /// Mobile number
    Phone,
    /// Delivery city
    City,
    /// Email address, optional
    Email,
    /// Full street address
    Address,
}

impl Field {
    /// All fields in the order a submission attempt validates them
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Phone,
        Field::City,
        Field::Email,
        Field::Address,
    ];
}

/// Validation state of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Never interacted with; no error is shown
    Untouched,
    /// Touched and passing its rule
    Valid,
    /// Touched and failing, with the message to render
    Invalid(&'static str),
}

/// True when the input is a plausible place or person name: at least three
/// characters after trimming, letters and spaces only
pub fn is_valid_place_name(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.len() >= 3 && LETTERS_AND_SPACES.is_match(trimmed)
}

/// Strip separators and an optional `+91`/`91` country prefix, returning
/// the bare 10-digit mobile number when valid
pub fn normalize_phone(input: &str) -> Option<String> {
    let compact: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let compact = compact.strip_prefix('+').unwrap_or(&compact);

    let digits = match compact.len() {
        12 => compact.strip_prefix("91").unwrap_or(compact),
        _ => compact,
    };

    PHONE.is_match(digits).then(|| digits.to_string())
}

/// Validate one field value against its rule
pub fn validate_field(field: Field, value: &str) -> Result<(), &'static str> {
    match field {
        Field::Name => is_valid_place_name(value)
            .then_some(())
            .ok_or("Please enter a valid full name"),
        Field::Phone => normalize_phone(value)
            .map(|_| ())
            .ok_or("Please enter a valid 10-digit Indian mobile number"),
        Field::City => is_valid_place_name(value)
            .then_some(())
            .ok_or("Please enter a valid city name"),
        Field::Email => {
            if value.trim().is_empty() || EMAIL.is_match(value.trim()) {
                Ok(())
            } else {
                Err("Please enter a valid email address")
            }
        }
        Field::Address => {
            if value.trim().is_empty() {
                Err("Full address is required")
            } else {
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default)]
struct FieldState {
    value: String,
    touched: bool,
}

/// The delivery-details form state machine
#[derive(Debug, Default)]
pub struct CheckoutForm {
    name: FieldState,
    phone: FieldState,
    city: FieldState,
    email: FieldState,
    address: FieldState,
}

impl CheckoutForm {
    /// New form with every field untouched
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, field: Field) -> &FieldState {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::City => &self.city,
            Field::Email => &self.email,
            Field::Address => &self.address,
        }
    }

    fn state_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Name => &mut self.name,
            Field::Phone => &mut self.phone,
            Field::City => &mut self.city,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
        }
    }

    /// Current raw value of a field
    pub fn value(&self, field: Field) -> &str {
        &self.state(field).value
    }

    /// Change event: update the value. Validation becomes live once the
    /// field has been touched, which [`CheckoutForm::status`] reflects by
    /// re-checking the current value on every call.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.state_mut(field).value = value.into();
    }

    /// Blur event: the field transitions to touched and starts showing
    /// its validation result
    pub fn blur(&mut self, field: Field) {
        self.state_mut(field).touched = true;
    }

    /// Validation status as the UI should render it
    pub fn status(&self, field: Field) -> FieldStatus {
        let state = self.state(field);
        if !state.touched {
            return FieldStatus::Untouched;
        }

        match validate_field(field, &state.value) {
            Ok(()) => FieldStatus::Valid,
            Err(message) => FieldStatus::Invalid(message),
        }
    }

    /// The error message to show for a field, if any
    pub fn visible_error(&self, field: Field) -> Option<&'static str> {
        match self.status(field) {
            FieldStatus::Invalid(message) => Some(message),
            _ => None,
        }
    }

    /// True when every field passes its rule, touched or not
    pub fn is_valid(&self) -> bool {
        Field::ALL
            .iter()
            .all(|field| validate_field(*field, &self.state(*field).value).is_ok())
    }

    /// Submission attempt: touch every field and either produce the
    /// validated customer details or the first invalid field, which the
    /// caller scrolls into view. Submission stays blocked while any field
    /// is invalid.
    pub fn submit(&mut self) -> Result<CustomerDetails, Field> {
        for field in Field::ALL {
            self.state_mut(field).touched = true;
        }

        for field in Field::ALL {
            if validate_field(field, &self.state(field).value).is_err() {
                return Err(field);
            }
        }

        let email = self.email.value.trim();
        let phone = normalize_phone(&self.phone.value).ok_or(Field::Phone)?;

        Ok(CustomerDetails {
            name: self.name.value.trim().to_string(),
            phone,
            email: (!email.is_empty()).then(|| email.to_string()),
            city: self.city.value.trim().to_string(),
            address: self.address.value.trim().to_string(),
        })
    }
}

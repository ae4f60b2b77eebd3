use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Guide,
    Tourist,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "GUIDE" => Some(Role::Guide),
            "TOURIST" => Some(Role::Tourist),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Guide => "GUIDE",
            Role::Tourist => "TOURIST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Paid,
    Confirmed,
    Cancelled,
    Completed,
    Failed,
}

impl BookingStatus {
    pub fn parse(raw: &str) -> Option<BookingStatus> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "PAID" => Some(BookingStatus::Paid),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "COMPLETED" => Some(BookingStatus::Completed),
            "FAILED" => Some(BookingStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Paid => "PAID",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Failed => "FAILED",
        }
    }

    /// Authoritative booking transition table. Anything not listed here is
    /// rejected; PAID as a target is additionally reserved for the gateway
    /// callback path and never reachable through manual updates.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, Completed | Cancelled),
            Paid => matches!(next, Completed | Cancelled),
            Completed => false,
            Cancelled => false,
            Failed => matches!(next, Pending),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Option<PaymentStatus> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PAID" => Some(PaymentStatus::Paid),
            "FAILED" => Some(PaymentStatus::Failed),
            "CANCELLED" => Some(PaymentStatus::Cancelled),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// UNPAID and FAILED payments can still move; everything else is settled.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Paid | PaymentStatus::Cancelled | PaymentStatus::Refunded
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIn {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "TOURIST".to_string()
}

#[derive(Debug, Serialize, Clone)]
pub struct UserOut {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub user_status: String,
}

#[derive(Debug, Deserialize)]
pub struct TourIn {
    pub title: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_max_group_size")]
    pub max_group_size: i32,
    pub meeting_point: Option<String>,
}

fn default_max_group_size() -> i32 {
    10
}

#[derive(Debug, Serialize, Clone)]
pub struct TourOut {
    pub id: String,
    pub guide_id: String,
    pub title: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub max_group_size: i32,
    pub meeting_point: Option<String>,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct BookingIn {
    pub tour_id: String,
    #[serde(default = "default_guest_count")]
    pub guest_count: i32,
}

fn default_guest_count() -> i32 {
    1
}

#[derive(Debug, Serialize, Clone)]
pub struct PaymentOut {
    pub id: String,
    pub booking_id: String,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub status: String,
    pub gateway_url: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct BookingOut {
    pub id: String,
    pub tourist_id: String,
    pub tour_id: String,
    pub guide_id: String,
    pub payment_id: Option<String>,
    pub guest_count: i32,
    pub total_price_cents: i64,
    pub commission_cents: i64,
    pub guide_earnings_cents: i64,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub payment: Option<PaymentOut>,
}

#[derive(Debug, Serialize)]
pub struct BookingCreateOut {
    pub payment_url: Option<String>,
    pub booking: BookingOut,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateIn {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentInitOut {
    pub payment_url: String,
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub ok: bool,
    pub transaction_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewIn {
    pub booking_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewOut {
    pub id: String,
    pub booking_id: String,
    pub tourist_id: String,
    pub tour_id: String,
    pub guide_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn pending_moves_to_confirmed_or_cancelled_only() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Failed));
    }

    #[test]
    fn paid_and_confirmed_share_the_same_exits() {
        for from in [Paid, Confirmed] {
            assert!(from.can_transition_to(Completed));
            assert!(from.can_transition_to(Cancelled));
            assert!(!from.can_transition_to(Pending));
            assert!(!from.can_transition_to(Paid));
        }
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in [Pending, Paid, Confirmed, Cancelled, Completed, Failed] {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?} must fail");
            }
        }
    }

    #[test]
    fn failed_only_retries_back_to_pending() {
        assert!(Failed.can_transition_to(Pending));
        for to in [Paid, Confirmed, Cancelled, Completed, Failed] {
            assert!(!Failed.can_transition_to(to));
        }
    }

    #[test]
    fn completed_never_reverts_to_confirmed() {
        assert!(!Completed.can_transition_to(Confirmed));
    }

    #[test]
    fn status_parse_is_case_insensitive_and_strict() {
        assert_eq!(BookingStatus::parse(" pending "), Some(Pending));
        assert_eq!(BookingStatus::parse("CONFIRMED"), Some(Confirmed));
        assert_eq!(BookingStatus::parse("nope"), None);
        assert_eq!(PaymentStatus::parse("refunded"), Some(PaymentStatus::Refunded));
        assert_eq!(PaymentStatus::parse(""), None);
    }

    #[test]
    fn payment_terminal_statuses() {
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Unpaid.is_terminal());
        assert!(!PaymentStatus::Failed.is_terminal());
    }
}

//! Enumerated column values: order states and account types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of an enum's database values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Lifecycle state of an order.
///
/// ```text
/// basket -> new -> confirmed -> assembled -> sent -> delivered
///    \        \         \           \         \
///     +--------+---------+-----------+---------+--> canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "market.order_state", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Items collected but not yet submitted.
    #[default]
    Basket,
    New,
    Confirmed,
    Assembled,
    Sent,
    Delivered,
    Canceled,
}

impl OrderState {
    /// All states in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Basket,
        Self::New,
        Self::Confirmed,
        Self::Assembled,
        Self::Sent,
        Self::Delivered,
        Self::Canceled,
    ];

    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basket => "basket",
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Assembled => "assembled",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basket => "basket state",
            other => other.as_str(),
        }
    }

    /// The state that follows this one on the happy path, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Basket => Some(Self::New),
            Self::New => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Assembled),
            Self::Assembled => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered | Self::Canceled => None,
        }
    }

    /// Terminal states accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }

    /// Whether an order may move from `self` to `target`.
    ///
    /// Only single forward steps are allowed, plus cancellation from any
    /// state before delivery.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Canceled || self.next() == Some(target)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "order state",
                value: s.to_owned(),
            })
    }
}

/// Kind of account: a seller that owns a shop, or a buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "market.user_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Shop,
    #[default]
    Buyer,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shop => write!(f, "shop"),
            Self::Buyer => write!(f, "buyer"),
        }
    }
}

impl FromStr for UserType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop" => Ok(Self::Shop),
            "buyer" => Ok(Self::Buyer),
            _ => Err(UnknownVariant {
                kind: "user type",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_state_parse_roundtrip() {
        for state in OrderState::ALL {
            assert_eq!(state.as_str().parse::<OrderState>().unwrap(), state);
        }
    }

    #[test]
    fn test_order_state_rejects_unknown_value() {
        let err = "shipped".parse::<OrderState>().unwrap_err();
        assert_eq!(err.value, "shipped");
        assert!("Basket".parse::<OrderState>().is_err());
    }

    #[test]
    fn test_order_state_default_is_basket() {
        assert_eq!(OrderState::default(), OrderState::Basket);
    }

    #[test]
    fn test_forward_chain() {
        let mut state = OrderState::Basket;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(state.can_transition_to(next));
            state = next;
            visited.push(state);
        }
        assert_eq!(state, OrderState::Delivered);
        assert_eq!(visited.len(), 6);
    }

    #[test]
    fn test_cancel_allowed_before_delivery() {
        for state in [
            OrderState::Basket,
            OrderState::New,
            OrderState::Confirmed,
            OrderState::Assembled,
            OrderState::Sent,
        ] {
            assert!(state.can_transition_to(OrderState::Canceled), "{state}");
        }
        assert!(!OrderState::Delivered.can_transition_to(OrderState::Canceled));
        assert!(!OrderState::Canceled.can_transition_to(OrderState::Canceled));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!OrderState::Basket.can_transition_to(OrderState::Confirmed));
        assert!(!OrderState::Sent.can_transition_to(OrderState::New));
        assert!(!OrderState::Canceled.can_transition_to(OrderState::Basket));
        assert!(!OrderState::New.can_transition_to(OrderState::New));
    }

    #[test]
    fn test_order_state_serde() {
        let json = serde_json::to_string(&OrderState::Assembled).unwrap();
        assert_eq!(json, "\"assembled\"");
    }

    #[test]
    fn test_user_type() {
        assert_eq!(UserType::default(), UserType::Buyer);
        assert_eq!("shop".parse::<UserType>().unwrap(), UserType::Shop);
        assert!("admin".parse::<UserType>().is_err());
        assert_eq!(UserType::Shop.to_string(), "shop");
    }
}

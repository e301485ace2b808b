//! Deal-type derivation for lead conversion.
//!
//! When a lead is converted, its interest flags decide the deal type. The
//! priority order is fixed: business funding wins over card terminal, which
//! wins over booking app; a lead with no interests becomes "Other".

pub const DEAL_TYPE_BUSINESS_FUNDING: &str = "Business Funding";
pub const DEAL_TYPE_CARD_TERMINAL: &str = "Card Terminal";
pub const DEAL_TYPE_BOOKING_APP: &str = "Booking App";
pub const DEAL_TYPE_OTHER: &str = "Other";

/// Default stage for a deal created from a converted lead.
pub const INITIAL_DEAL_STAGE: &str = "new";

/// Derive the deal type from a lead's interest flags.
pub fn derive_deal_type(bf_interest: bool, ct_interest: bool, ba_interest: bool) -> &'static str {
    if bf_interest {
        DEAL_TYPE_BUSINESS_FUNDING
    } else if ct_interest {
        DEAL_TYPE_CARD_TERMINAL
    } else if ba_interest {
        DEAL_TYPE_BOOKING_APP
    } else {
        DEAL_TYPE_OTHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_funding_has_highest_priority() {
        assert_eq!(derive_deal_type(true, true, true), DEAL_TYPE_BUSINESS_FUNDING);
        assert_eq!(derive_deal_type(true, false, false), DEAL_TYPE_BUSINESS_FUNDING);
    }

    #[test]
    fn card_terminal_beats_booking_app() {
        assert_eq!(derive_deal_type(false, true, true), DEAL_TYPE_CARD_TERMINAL);
    }

    #[test]
    fn booking_app_when_only_interest() {
        assert_eq!(derive_deal_type(false, false, true), DEAL_TYPE_BOOKING_APP);
    }

    #[test]
    fn no_interest_is_other() {
        assert_eq!(derive_deal_type(false, false, false), DEAL_TYPE_OTHER);
    }
}

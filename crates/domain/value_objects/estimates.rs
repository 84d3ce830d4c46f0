use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    delivery_types::DeliveryType, hours_override_modes::HoursOverrideMode,
};

/// Minutes a customer should expect to wait for an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EstimateRange {
    pub min: u32,
    pub max: u32,
}

impl EstimateRange {
    pub fn eta_text(&self) -> String {
        format!("{}-{} min", self.min, self.max)
    }
}

/// `[from, to)` in minutes since local midnight.
#[derive(Debug, Clone, Copy)]
struct EstimateSlot {
    from: u16,
    to: u16,
    range: EstimateRange,
}

impl EstimateSlot {
    fn contains(&self, minute_of_day: u16) -> bool {
        self.from <= minute_of_day && minute_of_day < self.to
    }
}

const fn slot(from: (u16, u16), to: (u16, u16), min: u32, max: u32) -> EstimateSlot {
    EstimateSlot {
        from: from.0 * 60 + from.1,
        to: to.0 * 60 + to.1,
        range: EstimateRange { min, max },
    }
}

const CLOSED: &[EstimateSlot] = &[];

const DELIVERY_WEEKDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 0), 30, 45),
    slot((19, 30), (23, 30), 40, 60),
];
const DELIVERY_FRIDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 0), 30, 45),
    slot((19, 0), (21, 30), 60, 90),
    slot((21, 30), (24, 0), 45, 70),
];
const DELIVERY_SATURDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 30), 35, 50),
    slot((19, 0), (21, 30), 60, 90),
    slot((21, 30), (24, 0), 45, 70),
];
const DELIVERY_SUNDAY: &[EstimateSlot] = &[
    slot((12, 0), (16, 0), 40, 60),
    slot((19, 30), (23, 30), 45, 60),
];

const RETIRO_WEEKDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 0), 15, 20),
    slot((19, 30), (23, 30), 20, 30),
];
const RETIRO_FRIDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 0), 15, 20),
    slot((19, 0), (21, 30), 30, 45),
    slot((21, 30), (24, 0), 20, 30),
];
const RETIRO_SATURDAY: &[EstimateSlot] = &[
    slot((11, 30), (15, 30), 15, 25),
    slot((19, 0), (21, 30), 30, 45),
    slot((21, 30), (24, 0), 20, 30),
];
const RETIRO_SUNDAY: &[EstimateSlot] = &[
    slot((12, 0), (16, 0), 20, 30),
    slot((19, 30), (23, 30), 20, 30),
];

/// Indexed by `Weekday::num_days_from_monday`. Mondays are closed.
const DELIVERY_TABLE: [&[EstimateSlot]; 7] = [
    CLOSED,
    DELIVERY_WEEKDAY,
    DELIVERY_WEEKDAY,
    DELIVERY_WEEKDAY,
    DELIVERY_FRIDAY,
    DELIVERY_SATURDAY,
    DELIVERY_SUNDAY,
];

const RETIRO_TABLE: [&[EstimateSlot]; 7] = [
    CLOSED,
    RETIRO_WEEKDAY,
    RETIRO_WEEKDAY,
    RETIRO_WEEKDAY,
    RETIRO_FRIDAY,
    RETIRO_SATURDAY,
    RETIRO_SUNDAY,
];

fn table_for(delivery_type: DeliveryType) -> &'static [&'static [EstimateSlot]; 7] {
    match delivery_type {
        DeliveryType::Retiro => &RETIRO_TABLE,
        DeliveryType::Delivery => &DELIVERY_TABLE,
    }
}

/// Range shown when an admin forces the store open outside the table.
pub fn fallback_range(delivery_type: DeliveryType) -> EstimateRange {
    match delivery_type {
        DeliveryType::Retiro => EstimateRange { min: 20, max: 30 },
        DeliveryType::Delivery => EstimateRange { min: 45, max: 60 },
    }
}

pub fn estimate_at(
    delivery_type: DeliveryType,
    weekday: Weekday,
    minute_of_day: u16,
) -> Option<EstimateRange> {
    table_for(delivery_type)[weekday.num_days_from_monday() as usize]
        .iter()
        .find(|slot| slot.contains(minute_of_day))
        .map(|slot| slot.range)
}

/// Looks up the ETA for `at` in the business time zone. `None` means closed.
pub fn estimate_for(
    delivery_type: DeliveryType,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<EstimateRange> {
    let local = at.with_timezone(&offset);
    let minute_of_day = (local.hour() * 60 + local.minute()) as u16;
    estimate_at(delivery_type, local.weekday(), minute_of_day)
}

pub fn is_open(at: DateTime<Utc>, offset: FixedOffset) -> bool {
    [DeliveryType::Retiro, DeliveryType::Delivery]
        .into_iter()
        .any(|delivery_type| estimate_for(delivery_type, at, offset).is_some())
}

/// Applies the admin override on top of the static table.
pub fn resolve_estimate(
    delivery_type: DeliveryType,
    at: DateTime<Utc>,
    offset: FixedOffset,
    mode: HoursOverrideMode,
) -> Option<EstimateRange> {
    match mode {
        HoursOverrideMode::Auto => estimate_for(delivery_type, at, offset),
        HoursOverrideMode::ForceClosed => None,
        HoursOverrideMode::ForceOpen => Some(
            estimate_for(delivery_type, at, offset)
                .unwrap_or_else(|| fallback_range(delivery_type)),
        ),
    }
}

pub fn business_offset(offset_minutes: i32) -> Option<FixedOffset> {
    offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub delivery_type: DeliveryType,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateDto {
    pub open: bool,
    pub delivery_type: DeliveryType,
    pub estimate: Option<EstimateRange>,
    pub eta_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ALL_DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn buenos_aires() -> FixedOffset {
        business_offset(-180).unwrap()
    }

    #[test]
    fn friday_evening_delivery_is_sixty_to_ninety() {
        let range = estimate_at(DeliveryType::Delivery, Weekday::Fri, 19 * 60 + 30).unwrap();
        assert_eq!(range, EstimateRange { min: 60, max: 90 });
        assert_eq!(range.eta_text(), "60-90 min");
    }

    #[test]
    fn utc_timestamp_is_shifted_into_business_time() {
        // 2026-10-16 is a Friday; 22:30Z is 19:30 at UTC-3.
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).unwrap();
        let range = estimate_for(DeliveryType::Delivery, at, buenos_aires()).unwrap();
        assert_eq!(range, EstimateRange { min: 60, max: 90 });
    }

    #[test]
    fn interval_start_is_inclusive_and_end_exclusive() {
        assert!(estimate_at(DeliveryType::Retiro, Weekday::Tue, 11 * 60 + 30).is_some());
        assert!(estimate_at(DeliveryType::Retiro, Weekday::Tue, 11 * 60 + 29).is_none());
        assert!(estimate_at(DeliveryType::Retiro, Weekday::Tue, 15 * 60 - 1).is_some());
        assert!(estimate_at(DeliveryType::Retiro, Weekday::Tue, 15 * 60).is_none());
    }

    #[test]
    fn adjacent_slots_hand_over_at_the_boundary() {
        let before = estimate_at(DeliveryType::Delivery, Weekday::Sat, 21 * 60 + 29).unwrap();
        let after = estimate_at(DeliveryType::Delivery, Weekday::Sat, 21 * 60 + 30).unwrap();
        assert_eq!(before, EstimateRange { min: 60, max: 90 });
        assert_eq!(after, EstimateRange { min: 45, max: 70 });
    }

    #[test]
    fn mondays_are_closed_all_day() {
        for minute in 0..24 * 60 {
            assert!(estimate_at(DeliveryType::Delivery, Weekday::Mon, minute).is_none());
            assert!(estimate_at(DeliveryType::Retiro, Weekday::Mon, minute).is_none());
        }
    }

    #[test]
    fn every_match_has_min_not_above_max() {
        for delivery_type in [DeliveryType::Retiro, DeliveryType::Delivery] {
            for day in ALL_DAYS {
                for minute in 0..24 * 60 {
                    if let Some(range) = estimate_at(delivery_type, day, minute) {
                        assert!(range.min <= range.max, "{day:?} {minute} {range:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn slots_are_ordered_and_do_not_overlap() {
        for table in [&DELIVERY_TABLE, &RETIRO_TABLE] {
            for slots in table.iter() {
                assert!(slots.len() <= 3);
                for pair in slots.windows(2) {
                    assert!(pair[0].to <= pair[1].from);
                }
                for slot in slots.iter() {
                    assert!(slot.from < slot.to && slot.to <= 24 * 60);
                }
            }
        }
    }

    #[test]
    fn minutes_outside_every_slot_resolve_to_none() {
        for delivery_type in [DeliveryType::Retiro, DeliveryType::Delivery] {
            for day in ALL_DAYS {
                let slots = table_for(delivery_type)[day.num_days_from_monday() as usize];
                for minute in 0..24 * 60 {
                    let covered = slots.iter().any(|slot| slot.contains(minute));
                    assert_eq!(estimate_at(delivery_type, day, minute).is_some(), covered);
                }
            }
        }
        assert!(estimate_at(DeliveryType::Delivery, Weekday::Wed, 17 * 60).is_none());
        assert!(estimate_at(DeliveryType::Retiro, Weekday::Sun, 3 * 60).is_none());
    }

    #[test]
    fn business_offset_rejects_out_of_range_minutes() {
        assert_eq!(business_offset(-180).map(|o| o.local_minus_utc()), Some(-10_800));
        assert!(business_offset(24 * 60).is_none());
        assert!(business_offset(i32::MAX).is_none());
        assert!(business_offset(i32::MIN).is_none());
    }

    #[test]
    fn override_modes_change_the_outcome() {
        // Monday 2026-10-19 10:00 local, closed in the table.
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let offset = buenos_aires();

        assert!(!is_open(at, offset));
        assert_eq!(
            resolve_estimate(DeliveryType::Delivery, at, offset, HoursOverrideMode::Auto),
            None
        );
        assert_eq!(
            resolve_estimate(DeliveryType::Delivery, at, offset, HoursOverrideMode::ForceOpen),
            Some(fallback_range(DeliveryType::Delivery))
        );

        let friday_night = Utc.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).unwrap();
        assert!(is_open(friday_night, offset));
        assert_eq!(
            resolve_estimate(
                DeliveryType::Retiro,
                friday_night,
                offset,
                HoursOverrideMode::ForceClosed
            ),
            None
        );
    }
}

use chrono::Datelike;
use proptest::prelude::*;
use xlcalc_common::{MAX_SERIAL_DATE, PHANTOM_LEAP_DAY, serial_to_date, serial_to_ymd};

use crate::builtins::datetime::{business_days_until, date_serial, weekday, workday};

fn serial() -> impl Strategy<Value = i64> {
    (1..=MAX_SERIAL_DATE).prop_filter("phantom leap day", |s| *s != PHANTOM_LEAP_DAY)
}

proptest! {
    #[test]
    fn date_rebuilds_every_serial(s in serial()) {
        let (y, m, d) = serial_to_ymd(s).unwrap();
        prop_assert_eq!(date_serial(i64::from(y), i64::from(m), i64::from(d)).unwrap(), s);
    }

    #[test]
    fn business_days_flip_sign_with_the_bounds(a in serial(), b in serial(), hol in serial()) {
        prop_assume!(a != b);
        let hols = [hol];
        prop_assert_eq!(
            business_days_until(a, b, &hols),
            -business_days_until(b, a, &hols)
        );
    }

    #[test]
    fn weekday_agrees_with_the_calendar(s in (PHANTOM_LEAP_DAY + 1)..=MAX_SERIAL_DATE) {
        let expected = i64::from(serial_to_date(s).unwrap().weekday().number_from_monday());
        prop_assert_eq!(weekday(s, 2).unwrap(), expected);
    }

    #[test]
    fn workday_covers_exactly_offset_business_days(
        start in 1_000i64..2_900_000,
        offset in prop_oneof![-500i64..=-1, 1i64..=500],
    ) {
        let end = workday(start, offset, &[]).unwrap();
        let step = offset.signum();
        prop_assert!(weekday(end, 2).unwrap() <= 5);
        prop_assert_eq!(business_days_until(start + step, end, &[]), offset);
    }

    #[test]
    fn workday_skips_holidays_even_when_repeated(
        start in 1_000i64..2_900_000,
        offset in prop_oneof![-500i64..=-1, 1i64..=500],
        deltas in prop::collection::vec(-800i64..800, 0..40),
        repeats in 0usize..5,
    ) {
        let mut hols: Vec<i64> = deltas.iter().map(|d| start + d).collect();
        let again: Vec<i64> = hols.iter().take(repeats).copied().collect();
        hols.extend(again);

        let end = workday(start, offset, &hols).unwrap();
        prop_assert!(weekday(end, 2).unwrap() <= 5);
        prop_assert!(!hols.contains(&end));

        let mut distinct = hols.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let step = offset.signum();
        prop_assert_eq!(business_days_until(start + step, end, &distinct), offset);
    }
}

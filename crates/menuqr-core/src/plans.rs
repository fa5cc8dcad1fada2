// Plan pricing/duration tables and pure subscription math.
//
// Deterministic, no I/O. Amounts are in paise; durations in days. These
// tables are the single source of truth for what a plan costs and how
// long it runs — the billing layer never trusts client-supplied amounts.

use chrono::{DateTime, Duration, Months, Utc};

use crate::models::{PlanType, Subscription, SubscriptionStatus};

/// Trial window granted on subscription creation.
pub const TRIAL_DAYS: i64 = 7;

/// Cafe limit for trial and basic plans.
pub const BASIC_CAFE_LIMIT: i64 = 2;

/// Cafe limit for pro plans. Effectively unbounded.
pub const PRO_CAFE_LIMIT: i64 = 1000;

/// Plan price in paise. Trial (and anything unpriced) is 0.
pub fn plan_amount(plan: PlanType) -> i64 {
    match plan {
        PlanType::Trial => 0,
        PlanType::BasicMonthly => 9_900,
        PlanType::ProMonthly => 19_900,
        PlanType::ProYearly => 100_000,
    }
}

/// Plan duration in days.
pub fn plan_duration_days(plan: PlanType) -> i64 {
    match plan {
        PlanType::Trial => TRIAL_DAYS,
        PlanType::BasicMonthly => 30,
        PlanType::ProMonthly => 30,
        PlanType::ProYearly => 365,
    }
}

/// Entitlement end date for a plan starting at `start`.
///
/// Paid plans use calendar addition (a month or a year, clamped to the
/// last valid day on rollover), so a yearly plan bought on Jan 15 renews
/// on Jan 15 regardless of leap years. The trial is a flat 7-day window.
pub fn calculate_end_date(plan: PlanType, start: DateTime<Utc>) -> DateTime<Utc> {
    match plan {
        PlanType::Trial => start + Duration::days(TRIAL_DAYS),
        PlanType::BasicMonthly | PlanType::ProMonthly => start
            .checked_add_months(Months::new(1))
            .unwrap_or(start + Duration::days(plan_duration_days(plan))),
        PlanType::ProYearly => start
            .checked_add_months(Months::new(12))
            .unwrap_or(start + Duration::days(plan_duration_days(plan))),
    }
}

/// Cafe limit for a plan tier.
pub fn cafe_limit(plan: PlanType) -> i64 {
    if plan.is_pro() {
        PRO_CAFE_LIMIT
    } else {
        BASIC_CAFE_LIMIT
    }
}

/// Whether a subscription is expired as of `now`.
/// `end_date` is authoritative; a persisted `Expired` status also counts
/// even if the clock disagrees.
pub fn is_expired(sub: &Subscription, now: DateTime<Utc>) -> bool {
    now > sub.end_date || sub.status == SubscriptionStatus::Expired
}

/// Whole days remaining until `end_date`, rounded up, floored at 0.
pub fn days_remaining(end_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = end_date - now;
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    (millis + DAY_MS - 1) / DAY_MS
}

/// Human-readable plan name for UI messages.
pub fn plan_display_name(plan: PlanType) -> &'static str {
    match plan {
        PlanType::Trial => "Free Trial",
        PlanType::BasicMonthly => "Basic Monthly",
        PlanType::ProMonthly => "Pro Monthly",
        PlanType::ProYearly => "Pro Yearly",
    }
}

/// Format a paise amount as rupees for display.
pub fn format_amount(amount_in_paise: i64) -> String {
    format!("₹{:.2}", amount_in_paise as f64 / 100.0)
}

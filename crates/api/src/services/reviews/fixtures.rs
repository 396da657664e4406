//! Synthetic review fixtures.
//!
//! Generates plausible place-details reviews for tests and for
//! `sparksonic-cli seed reviews`. Never used on the live request path.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::MAX_REVIEWS;
use crate::models::{Review, ReviewSummary};

/// Default fixture size.
pub const DEFAULT_REVIEW_COUNT: usize = 54;

/// How far back generated reviews may date.
const MAX_AGE_DAYS: i64 = 730;

/// Share of five-star reviews; the rest get four.
const FIVE_STAR_SHARE: f64 = 0.85;

/// Chance that a review joins two texts.
const DOUBLE_TEXT_CHANCE: f64 = 0.3;

const TEXTS: &[&str] = &[
    "Excellent service! Very professional team. Highly recommend for solar panel installation.",
    "Great experience with the EV charger installation. Quick and efficient work.",
    "Professional electricians, fair pricing, and excellent customer service.",
    "Solar panels installed perfectly. The team was knowledgeable and respectful.",
    "Best electrical service in Luxembourg! Very satisfied with the heat pump installation.",
    "Quick response time and quality work. Will definitely use again.",
    "Fantastic job on our home automation system. Everything works perfectly.",
    "Very impressed with the professionalism and attention to detail.",
    "Fair prices and excellent workmanship. Highly recommended!",
    "The team was punctual, professional, and did an amazing job.",
    "Outstanding service from start to finish. Very happy with the solar installation.",
    "Great communication throughout the project. Exceeded expectations.",
    "Professional team that knows what they're doing. Five stars!",
    "Excellent electrical work. Clean, efficient, and professional.",
    "Highly recommend for any electrical needs. Top-notch service!",
    "Very satisfied with the EV charger installation. Works perfectly.",
    "Professional, courteous, and skilled technicians. Great job!",
    "Best experience we've had with any contractor. Highly professional.",
    "Quality work at reasonable prices. Will use again for sure.",
    "Impressed with the level of expertise and professionalism.",
];

const FIRST_NAMES: &[&str] = &[
    "Jean", "Marie", "Michel", "Sophie", "Laurent", "Anne", "Pierre", "Nathalie", "François",
    "Catherine", "Thomas", "Julie", "Nicolas", "Isabelle", "Alexandre", "Patricia", "Olivier",
    "Christine", "Philippe", "Sylvie", "David", "Martine", "Luc", "Monique", "André",
    "Françoise", "Marc", "Brigitte", "Paul", "Valérie",
];

const LAST_NAMES: &[&str] = &[
    "Muller", "Schmidt", "Weber", "Meyer", "Wagner", "Becker", "Schulz", "Hoffmann", "Schmitt",
    "Koch", "Bauer", "Richter", "Klein", "Wolf", "Schroeder", "Neumann", "Schwarz", "Zimmermann",
    "Braun", "Krüger", "Hartmann", "Lange", "Werner", "Schmitz", "Krause", "Meier", "Lehmann",
    "Huber", "Mayer", "Herrmann",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Human-style age label, as the upstream shows it.
fn relative_time(days_ago: i64) -> String {
    if days_ago > 60 {
        format!("{} months ago", days_ago / 30)
    } else {
        format!("{days_ago} days ago")
    }
}

/// Generate `count` reviews dated within two years before `now`, newest first.
pub fn generate_reviews<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<Review> {
    let mut reviews: Vec<Review> = (0..count)
        .map(|_| {
            let days_ago = rng.random_range(1..=MAX_AGE_DAYS);
            let rating = if rng.random_bool(FIVE_STAR_SHARE) { 5 } else { 4 };

            let text = if rng.random_bool(DOUBLE_TEXT_CHANCE) {
                format!("{} {}", pick(rng, TEXTS), pick(rng, TEXTS))
            } else {
                pick(rng, TEXTS).to_owned()
            };

            let gender = if rng.random_bool(0.5) { "men" } else { "women" };
            let contributor: u128 =
                rng.random_range(100_000_000_000_000_000_000..1_000_000_000_000_000_000_000);

            Review {
                author_name: format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
                author_url: Some(format!("https://www.google.com/maps/contrib/{contributor}")),
                language: Some("en".to_owned()),
                profile_photo_url: Some(format!(
                    "https://randomuser.me/api/portraits/{gender}/{}.jpg",
                    rng.random_range(1..=99)
                )),
                rating,
                relative_time_description: Some(relative_time(days_ago)),
                text,
                time: (now - Duration::days(days_ago)).timestamp(),
            }
        })
        .collect();

    reviews.sort_by(|a, b| b.time.cmp(&a.time));
    reviews
}

/// Summarize a full fixture set the way the upstream would.
///
/// The rating is the mean rounded to one decimal; only the first
/// [`MAX_REVIEWS`] reviews are kept.
#[must_use]
pub fn summarize(reviews: &[Review]) -> ReviewSummary {
    let total = reviews.len();
    let rating = if total == 0 {
        5.0
    } else {
        let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / total as f64;
        (mean * 10.0).round() / 10.0
    };

    ReviewSummary {
        rating,
        total_reviews: u64::try_from(total).unwrap_or(u64::MAX),
        reviews: reviews.iter().take(MAX_REVIEWS).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap_or_default()
    }

    #[test]
    fn test_generated_reviews_are_sorted_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let reviews = generate_reviews(&mut rng, DEFAULT_REVIEW_COUNT, now());

        assert_eq!(reviews.len(), DEFAULT_REVIEW_COUNT);
        assert!(reviews.windows(2).all(|w| w[0].time >= w[1].time));

        let oldest = (now() - Duration::days(MAX_AGE_DAYS)).timestamp();
        for review in &reviews {
            assert!(review.rating == 4 || review.rating == 5);
            assert!(review.time < now().timestamp());
            assert!(review.time >= oldest);
            assert!(!review.text.is_empty());
            assert_eq!(review.author_name.split(' ').count(), 2);
        }
    }

    #[test]
    fn test_mostly_five_stars() {
        let mut rng = StdRng::seed_from_u64(42);
        let reviews = generate_reviews(&mut rng, 2_000, now());
        let five = reviews.iter().filter(|r| r.rating == 5).count();

        // 85% expected; allow generous slack for sampling noise.
        assert!((1_550..=1_850).contains(&five), "{five}");
    }

    #[test]
    fn test_relative_time_labels() {
        assert_eq!(relative_time(3), "3 days ago");
        assert_eq!(relative_time(60), "60 days ago");
        assert_eq!(relative_time(61), "2 months ago");
        assert_eq!(relative_time(730), "24 months ago");
    }

    #[test]
    fn test_summarize() {
        let mut rng = StdRng::seed_from_u64(1);
        let reviews = generate_reviews(&mut rng, 20, now());
        let summary = summarize(&reviews);

        assert_eq!(summary.total_reviews, 20);
        assert_eq!(summary.reviews.len(), MAX_REVIEWS);
        assert!((4.0..=5.0).contains(&summary.rating));
        assert_eq!(summary.reviews[0], reviews[0]);

        assert!((summarize(&[]).rating - 5.0).abs() < f64::EPSILON);
    }
}

use moneta_core::{Category, MerchantMap};

use crate::re;

re!(re_refund, r"\b(payment|autopay|credit|refund|returned|reversal)\b");

/// Ordered keyword rules. Earlier categories win when several keyword
/// lists match the same merchant; Unknown and Payment/Credit carry no
/// keywords (the former is the fallback, the latter comes from the refund
/// heuristic).
const KEYWORD_RULES: &[(Category, &[&str])] = &[
    (Category::FoodGroceries, &[
        "grocery", "groceries", "supermarket", "market", "kroger", "safeway",
        "whole foods", "trader joe", "aldi", "costco", "heb", "publix",
        "wegmans", "food lion", "sprouts",
    ]),
    (Category::EatingOut, &[
        "restaurant", "cafe", "coffee", "starbucks", "mcdonald", "chipotle",
        "taco", "pizza", "burger", "sushi", "doordash", "grubhub", "uber eats",
        "dunkin", "subway", "wendy", "kfc", "chick-fil-a", "panera", "deli",
        "bakery", "grill",
    ]),
    (Category::TransportFuel, &[
        "shell", "chevron", "exxon", "mobil", "valero", "gas", "fuel", "uber",
        "lyft", "parking", "toll", "transit", "metro", "amtrak", "car wash",
    ]),
    (Category::HealthWellness, &[
        "pharmacy", "cvs", "walgreens", "rite aid", "doctor", "dental",
        "clinic", "hospital", "gym", "fitness", "yoga", "optical",
        "urgent care", "medical", "health",
    ]),
    (Category::Shopping, &[
        "amazon", "walmart", "target", "best buy", "ebay", "etsy",
        "home depot", "lowe's", "ikea", "nordstrom", "macy", "marshalls",
        "tj maxx", "rei", "sephora",
    ]),
    (Category::Entertainment, &[
        "cinema", "movie", "theater", "theatre", "concert", "ticketmaster",
        "steam", "playstation", "xbox", "nintendo", "arcade", "bowling",
        "museum",
    ]),
    (Category::UtilitiesBills, &[
        "electric", "water", "sewer", "utility", "utilities", "internet",
        "comcast", "xfinity", "verizon", "t-mobile", "at&t", "spectrum",
        "energy", "insurance", "phone",
    ]),
    (Category::RentMortgage, &[
        "rent", "mortgage", "apartment", "landlord", "property management",
        "lease", "realty",
    ]),
    (Category::Travel, &[
        "airline", "airlines", "airways", "hotel", "motel", "airbnb", "delta",
        "united", "southwest", "jetblue", "marriott", "hilton", "hyatt",
        "expedia", "booking.com", "cruise", "flight",
    ]),
    (Category::Subscriptions, &[
        "netflix", "spotify", "hulu", "disney+", "hbo", "prime video",
        "youtube premium", "subscription", "patreon", "membership", "audible",
        "icloud", "dropbox",
    ]),
    (Category::Education, &[
        "tuition", "university", "college", "school", "udemy", "coursera",
        "textbook", "campus",
    ]),
];

/// Decide a category for a merchant/amount pair.
///
/// Precedence, first applicable rule wins:
/// 1. empty merchant → Unknown;
/// 2. negative amount or refund-like merchant text → Payment/Credit;
///    this runs before the mapping lookup, so a mapped "Venmo Refund Co"
///    still lands here;
/// 3. user mapping, exact key then case-insensitive, ignoring values that
///    are not members of the closed category set;
/// 4. first keyword-table hit in table order;
/// 5. Unknown.
pub fn categorize(merchant: &str, amount: f64, mappings: &MerchantMap) -> Category {
    let merchant = merchant.trim();
    if merchant.is_empty() {
        return Category::Unknown;
    }

    let lower = merchant.to_lowercase();
    if amount < 0.0 || re_refund().is_match(&lower) {
        return Category::PaymentCredit;
    }

    if let Some(cat) = mappings.get(merchant).and_then(|label| label.parse().ok()) {
        return cat;
    }
    if let Some(cat) = mappings
        .iter()
        .filter(|(key, _)| key.to_lowercase() == lower)
        .find_map(|(_, label)| label.parse().ok())
    {
        return cat;
    }

    for (category, keywords) in KEYWORD_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *category;
        }
    }

    Category::Unknown
}

//! Randomized test entities.
//!
//! Field values are random but well-typed: non-empty strings, positive
//! quantities, two-decimal prices. Seed the generator to make a test run
//! reproducible.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default prefix for [`EntityGenerator::string`].
pub const DEFAULT_STRING_PREFIX: &str = "test";
/// Default random suffix length for [`EntityGenerator::string`].
pub const DEFAULT_STRING_LENGTH: usize = 8;
/// Default inclusive lower bound for [`EntityGenerator::number`].
pub const DEFAULT_NUMBER_MIN: i64 = 1;
/// Default inclusive upper bound for [`EntityGenerator::number`].
pub const DEFAULT_NUMBER_MAX: i64 = 100;

/// Inclusive bounds on the number of items in a generated order.
pub const ORDER_ITEMS: (usize, usize) = (1, 5);
/// Inclusive bounds on the quantity of one order item.
pub const ITEM_QUANTITY: (u32, u32) = (1, 10);
/// Inclusive bounds on a price, in cents.
const PRICE_CENTS: (u64, u64) = (100, 100_000);

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
    "Radia", "Donald", "Hedy", "Niklaus", "Sophie", "Tim",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra", "Perlman", "Knuth", "Lamarr", "Wirth", "Wilson", "Berners-Lee",
];
const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "test.local"];
const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Elm", "Willow", "Birch", "Lakeview", "Hillcrest", "Sunset", "Park",
];
const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way"];
const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Fairview", "Franklin", "Greenville", "Bristol", "Clinton",
    "Georgetown", "Salem", "Madison",
];
const STATES: &[&str] = &[
    "Alabama", "California", "Colorado", "Florida", "Georgia", "Illinois", "Maine", "Nevada",
    "Ohio", "Oregon", "Texas", "Vermont", "Washington",
];
const ADJECTIVES: &[&str] = &[
    "Ergonomic", "Rustic", "Sleek", "Handcrafted", "Refined", "Practical", "Gorgeous", "Small",
    "Intelligent", "Generic",
];
const MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Bamboo", "Frozen",
];
const PRODUCTS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants", "Shirt",
    "Table", "Shoes", "Hat", "Towels", "Soap", "Lamp",
];
const DEPARTMENTS: &[&str] = &[
    "Books", "Electronics", "Garden", "Grocery", "Home", "Kids", "Music", "Outdoors", "Sports",
    "Tools", "Toys",
];
const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "and Sons", "Ltd"];
const DESCRIPTION_TAILS: &[&str] = &[
    "built for everyday use",
    "with a lifetime warranty",
    "designed for comfort and durability",
    "that ships in recyclable packaging",
    "tested by our quality team",
];

/// A generated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// One line of a generated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    /// Always at least 1.
    pub quantity: u32,
    /// Non-negative, two decimal places.
    pub price: f64,
}

impl OrderItem {
    /// `price * quantity` for this line.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A generated order.
///
/// `total_amount` is the left fold of [`OrderItem::line_total`] over
/// `items` in order, starting from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
}

impl Order {
    /// Builds an order, computing its total from the items.
    pub fn from_items(order_id: String, items: Vec<OrderItem>) -> Self {
        let total_amount = sum_line_totals(&items);
        Self {
            order_id,
            items,
            total_amount,
        }
    }
}

/// Sum of `price * quantity` over `items`, folded left from zero.
pub fn sum_line_totals(items: &[OrderItem]) -> f64 {
    items
        .iter()
        .fold(0.0, |sum, item| sum + item.line_total())
}

/// A generated product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub brand: String,
}

/// Generates randomized entities from a seedable RNG.
#[derive(Debug, Clone)]
pub struct EntityGenerator {
    rng: StdRng,
}

impl EntityGenerator {
    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed; the same seed yields the same entities.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A random user.
    pub fn user(&mut self) -> User {
        let first_name = self.pick(FIRST_NAMES).to_string();
        let last_name = self.pick(LAST_NAMES).to_string();
        let email = format!(
            "{}.{}{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            self.rng.gen_range(1..1000),
            self.pick(EMAIL_DOMAINS)
        );
        let phone = format!(
            "555-{:03}-{:04}",
            self.rng.gen_range(200..1000),
            self.rng.gen_range(0..10_000)
        );
        let address = format!(
            "{} {} {}",
            self.rng.gen_range(1..10_000),
            self.pick(STREET_NAMES),
            self.pick(STREET_SUFFIXES)
        );

        User {
            first_name,
            last_name,
            email,
            phone,
            address,
            city: self.pick(CITIES).to_string(),
            state: self.pick(STATES).to_string(),
            zip_code: format!("{:05}", self.rng.gen_range(501..100_000)),
        }
    }

    /// A random order with 1 to 5 items.
    pub fn order(&mut self) -> Order {
        let count = self.rng.gen_range(ORDER_ITEMS.0..=ORDER_ITEMS.1);
        let items = (0..count)
            .map(|_| OrderItem {
                product_id: self.uuid(),
                product_name: self.product_name(),
                quantity: self.rng.gen_range(ITEM_QUANTITY.0..=ITEM_QUANTITY.1),
                price: self.price(),
            })
            .collect();

        let order_id = self.uuid();
        Order::from_items(order_id, items)
    }

    /// A random product.
    pub fn product(&mut self) -> Product {
        let name = self.product_name();
        let description = format!(
            "The {} {} {}",
            self.pick(ADJECTIVES).to_lowercase(),
            self.pick(PRODUCTS).to_lowercase(),
            self.pick(DESCRIPTION_TAILS)
        );
        let brand = format!("{} {}", self.pick(LAST_NAMES), self.pick(COMPANY_SUFFIXES));

        Product {
            product_id: self.uuid(),
            name,
            description,
            price: self.price(),
            category: self.pick(DEPARTMENTS).to_string(),
            brand,
        }
    }

    /// `<prefix>_<length random alphanumerics>`.
    pub fn string(&mut self, prefix: &str, length: usize) -> String {
        let suffix: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        format!("{}_{}", prefix, suffix)
    }

    /// A random integer in `min..=max` (bounds are swapped if reversed).
    pub fn number(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    fn uuid(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.gen())
            .into_uuid()
            .to_string()
    }

    fn price(&mut self) -> f64 {
        let cents = self.rng.gen_range(PRICE_CENTS.0..=PRICE_CENTS.1);
        cents as f64 / 100.0
    }

    fn product_name(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(ADJECTIVES),
            self.pick(MATERIALS),
            self.pick(PRODUCTS)
        )
    }

    fn pick(&mut self, choices: &[&'static str]) -> &'static str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

impl Default for EntityGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

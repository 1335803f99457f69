use super::DatasetLoader;
use crate::dataset::{Dataset, Transaction};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SAMPLE_ROWS: usize = 1000;
const SEED: u64 = 42;

const SUPPLIERS: [&str; 4] = [
    "REPUBLIC NATIONAL DISTRIBUTING CO",
    "PWSWN INC",
    "RELIABLE CHURCHILL LLLP",
    "LANTERNA DISTRIBUTORS INC",
];
const ITEM_TYPES: [&str; 3] = ["WINE", "BEER", "SPIRITS"];
const YEARS: [i32; 2] = [2024, 2025];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates a reproducible synthetic dataset: the same row count always
/// yields the same rows.
#[derive(Debug, Clone)]
pub struct SampleLoader {
    rows: usize,
}

impl SampleLoader {
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        let mut rng = StdRng::seed_from_u64(SEED);
        (0..self.rows)
            .map(|i| {
                let item_type = ITEM_TYPES[rng.gen_range(0..ITEM_TYPES.len())];
                Transaction {
                    year: YEARS[rng.gen_range(0..YEARS.len())],
                    month: rng.gen_range(1..=12),
                    supplier: SUPPLIERS[rng.gen_range(0..SUPPLIERS.len())].to_string(),
                    item_code: format!("ITEM{:03}", i % 100),
                    item_description: format!("Sample {} {}", item_type, i % 100),
                    item_type: item_type.to_string(),
                    retail_sales: round2(rng.gen_range(10.0..1000.0)),
                    retail_transfers: round2(rng.gen_range(0.0..100.0)),
                    warehouse_sales: round2(rng.gen_range(0.0..500.0)),
                }
            })
            .collect()
    }
}

impl DatasetLoader for SampleLoader {
    fn describe(&self) -> String {
        format!("sample data ({} rows)", self.rows)
    }

    fn load(&self) -> Result<Dataset> {
        Dataset::from_transactions(&self.transactions())
    }
}

//! Deterministic demo data: books with JSON-text embeddings and a skewed
//! ratings workload in which a small popular set absorbs most of the votes.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{
    Rng, SeedableRng,
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    seq::SliceRandom,
};
use rusqlite::{Connection, params};

use crate::errors::SqlBenchError;

const BOOK_TITLES: &[&str] = &[
    "The Great Gatsby",
    "To Kill a Mockingbird",
    "1984",
    "Pride and Prejudice",
    "The Catcher in the Rye",
    "Lord of the Flies",
    "Animal Farm",
    "Brave New World",
    "The Hobbit",
    "The Lord of the Rings",
    "Dune",
    "Foundation",
    "Neuromancer",
    "Snow Crash",
    "The Martian",
    "Project Hail Mary",
    "The Three-Body Problem",
    "The Dark Forest",
    "Leviathan Wakes",
    "The Hunger Games",
    "Catching Fire",
    "The Maze Runner",
    "The Fault in Our Stars",
    "Paper Towns",
    "The Song of Achilles",
    "Circe",
    "Red Dragon",
    "Gone Girl",
    "Sharp Objects",
    "The Da Vinci Code",
    "Inferno",
    "The Alchemist",
];

const AUTHORS: &[&str] = &[
    "F. Scott Fitzgerald",
    "Harper Lee",
    "George Orwell",
    "Jane Austen",
    "J.D. Salinger",
    "William Golding",
    "Aldous Huxley",
    "J.R.R. Tolkien",
    "Frank Herbert",
    "Isaac Asimov",
    "William Gibson",
    "Neal Stephenson",
    "Andy Weir",
    "Liu Cixin",
    "James S.A. Corey",
    "Suzanne Collins",
    "James Dashner",
    "John Green",
    "Madeline Miller",
    "Thomas Harris",
    "Gillian Flynn",
    "Dan Brown",
    "Paulo Coelho",
];

// Star weights for 1..=5. One draw in five is a "classic" that skews high;
// the rest skew low.
const CLASSIC_WEIGHTS: [u32; 5] = [5, 10, 20, 40, 25];
const REGULAR_WEIGHTS: [u32; 5] = [25, 35, 25, 12, 3];

const RATING_WINDOW_SECS: u64 = 730 * 86_400;

/// Knobs for one seeding pass. The same seed and counts always produce the
/// same books and rating tuples; only the rating timestamps track the
/// current clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedConfig {
    pub seed: u64,
    pub books: u32,
    pub users: u32,
    pub ratings: u32,
    pub embedding_dim: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            books: 100,
            users: 50,
            ratings: 1000,
            embedding_dim: 1536,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedReport {
    pub books: u32,
    pub ratings: u32,
}

/// Populate the fixture in one transaction.
pub fn seed_fixture(conn: &Connection, config: &SeedConfig) -> Result<SeedReport, SqlBenchError> {
    if config.books == 0 {
        return Err(SqlBenchError::invalid_input("books must be positive"));
    }
    if config.users == 0 {
        return Err(SqlBenchError::invalid_input("users must be positive"));
    }
    if config.embedding_dim == 0 {
        return Err(SqlBenchError::invalid_input(
            "embedding_dim must be positive",
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    conn.execute("BEGIN IMMEDIATE", [])
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    let result: Result<SeedReport, SqlBenchError> = (|| {
        let book_ids = insert_books(conn, config, &mut rng)?;
        insert_ratings(conn, config, &mut rng, &book_ids)?;
        Ok(SeedReport {
            books: config.books,
            ratings: config.ratings,
        })
    })();
    match result {
        Ok(report) => {
            conn.execute("COMMIT", [])
                .map_err(|e| SqlBenchError::query(e.to_string()))?;
            Ok(report)
        }
        Err(err) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(err)
        }
    }
}

fn insert_books(
    conn: &Connection,
    config: &SeedConfig,
    rng: &mut StdRng,
) -> Result<Vec<i64>, SqlBenchError> {
    let mut insert = conn
        .prepare("INSERT INTO books(title, embedding) VALUES(?1, ?2)")
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    let mut book_ids = Vec::with_capacity(config.books as usize);
    for _ in 0..config.books {
        let title = generate_title(rng)?;
        let embedding = embedding_json(rng, config.embedding_dim)?;
        insert
            .execute(params![title, embedding])
            .map_err(|e| SqlBenchError::query(e.to_string()))?;
        book_ids.push(conn.last_insert_rowid());
    }
    Ok(book_ids)
}

fn insert_ratings(
    conn: &Connection,
    config: &SeedConfig,
    rng: &mut StdRng,
    book_ids: &[i64],
) -> Result<(), SqlBenchError> {
    if config.ratings == 0 {
        return Ok(());
    }
    let popular = pick_popular(rng, book_ids);
    let classic = WeightedIndex::new(CLASSIC_WEIGHTS)
        .map_err(|e| SqlBenchError::invalid_input(e.to_string()))?;
    let regular = WeightedIndex::new(REGULAR_WEIGHTS)
        .map_err(|e| SqlBenchError::invalid_input(e.to_string()))?;
    let now = unix_now();

    let mut insert = conn
        .prepare("INSERT INTO ratings(user_id, book_id, rating, ts) VALUES(?1, ?2, ?3, ?4)")
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    for _ in 0..config.ratings {
        let user_id = rng.gen_range(1..=i64::from(config.users));
        // Popular books take 70% of the votes.
        let pool = if !popular.is_empty() && rng.gen_bool(0.7) {
            popular.as_slice()
        } else {
            book_ids
        };
        let book_id = *pool
            .choose(rng)
            .ok_or_else(|| SqlBenchError::invalid_input("no books to rate"))?;
        let rating = draw_star(rng, &classic, &regular);
        let ts = now.saturating_sub(rng.gen_range(0..RATING_WINDOW_SECS)) as i64;
        insert
            .execute(params![user_id, book_id, rating, ts])
            .map_err(|e| SqlBenchError::query(e.to_string()))?;
    }
    Ok(())
}

fn generate_title(rng: &mut StdRng) -> Result<String, SqlBenchError> {
    let base = *BOOK_TITLES
        .choose(rng)
        .ok_or_else(|| SqlBenchError::invalid_input("empty title pool"))?;
    let styled = match rng.gen_range(0..9) {
        0 => base.to_string(),
        1 => format!("The {base}"),
        2 => format!("{base} Returns"),
        3 => format!("{base} Revisited"),
        4 => format!("Beyond {base}"),
        5 => format!("{base} Chronicles"),
        6 => format!("The {base} Saga"),
        7 => format!("{base} Trilogy"),
        _ => format!("{base} Series"),
    };
    let author = *AUTHORS
        .choose(rng)
        .ok_or_else(|| SqlBenchError::invalid_input("empty author pool"))?;
    Ok(format!("{styled} by {author}"))
}

fn embedding_json(rng: &mut StdRng, dim: usize) -> Result<String, SqlBenchError> {
    let values: Vec<f64> = (0..dim).map(|_| rng.gen_range(0.0..1.0)).collect();
    serde_json::to_string(&values).map_err(|e| SqlBenchError::invalid_input(e.to_string()))
}

/// A third of the catalog, capped at ten books.
fn pick_popular(rng: &mut StdRng, book_ids: &[i64]) -> Vec<i64> {
    let take = (book_ids.len() / 3).min(10);
    if take == 0 {
        return Vec::new();
    }
    let mut ids = book_ids.to_vec();
    ids.shuffle(rng);
    ids.truncate(take);
    ids
}

fn draw_star(rng: &mut StdRng, classic: &WeightedIndex<u32>, regular: &WeightedIndex<u32>) -> i64 {
    let weights = if rng.gen_bool(0.2) { classic } else { regular };
    weights.sample(rng) as i64 + 1
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

//! Random render contexts for the page template.

use rand::Rng;

#[derive(serde::Serialize)]
pub struct Context {
    pub title: String,
    pub users: Vec<User>,
}

#[derive(serde::Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
    pub is_disabled: bool,
}

/// Generates a context with `n` users. Names contain characters that need
/// escaping so the escape formatter is part of the measurement.
pub fn random(n: usize) -> Context {
    let mut rng = rand::thread_rng();
    let title = word(&mut rng, 20);
    let users = (0..n)
        .map(|_| User {
            name: format!("{} & <{}>", word(&mut rng, 8), word(&mut rng, 8)),
            age: rng.gen_range(18..90),
            is_disabled: rng.gen_bool(0.25),
        })
        .collect();
    Context { title, users }
}

fn word(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}

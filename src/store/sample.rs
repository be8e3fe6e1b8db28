use crate::models::Movie;

use super::Dataset;

/// Small built-in catalog used when no dataset file can be loaded
pub fn sample_dataset() -> Dataset {
    let movies = vec![
        Movie::new(1, "The Shawshank Redemption (1994)", ["Drama"]).with_stats(317, 4.43),
        Movie::new(2, "The Godfather (1972)", ["Crime", "Drama"]).with_stats(192, 4.29),
        Movie::new(3, "The Dark Knight (2008)", ["Action", "Crime", "Drama"]).with_stats(149, 4.24),
        Movie::new(4, "Pulp Fiction (1994)", ["Crime", "Drama"]).with_stats(307, 4.20),
        Movie::new(5, "Fight Club (1999)", ["Drama", "Thriller"]).with_stats(218, 4.27),
        Movie::new(6, "Inception (2010)", ["Action", "Sci-Fi", "Thriller"]).with_stats(143, 4.07),
        Movie::new(7, "The Matrix (1999)", ["Action", "Sci-Fi"]).with_stats(278, 4.19),
        Movie::new(8, "Goodfellas (1990)", ["Biography", "Crime", "Drama"]).with_stats(126, 4.25),
        Movie::new(9, "The Silence of the Lambs (1991)", ["Crime", "Drama", "Thriller"]).with_stats(279, 4.16),
        Movie::new(10, "Interstellar (2014)", ["Adventure", "Drama", "Sci-Fi"]).with_stats(73, 3.99),
    ];

    Dataset::new(movies, Vec::new())
}

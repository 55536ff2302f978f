use catalogue::{MemoryRepository, Repository};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data");

    println!("Loading movie catalogue...\n");

    let start = Instant::now();
    let repo = MemoryRepository::load_from_files(data_dir)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (users, movies, comments) = repo.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", movies);
    println!("Users: {}", users);
    println!("Comments: {}", comments);
    println!("Years: {:?}", repo.years());
    println!("Genres: {}, actors: {}, directors: {}",
             repo.genres().len(), repo.actors().len(), repo.directors().len());
    println!("\nPerformance: {:.0} movies/second",
             movies as f64 / elapsed.as_secs_f64());
}

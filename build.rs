use schema::{GameTables, MoveData, SpeciesData, TrainerTables};
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=data/moves.ron");
    println!("cargo:rerun-if-changed=data/species.ron");
    println!("cargo:rerun-if-changed=data/trainers.ron");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");

    let moves: Vec<MoveData> = load_ron("data/moves.ron");
    let species: Vec<SpeciesData> = load_ron("data/species.ron");
    let trainers: TrainerTables = load_ron("data/trainers.ron");

    let tables = GameTables {
        moves,
        species,
        gym_leaders: trainers.gym_leaders,
        elite_four: trainers.elite_four,
        rival: trainers.rival,
    };

    // A dangling reference is a data bug; fail the build rather than ship it.
    let missing = tables.dangling_references();
    if !missing.is_empty() {
        panic!("Unresolved data references:\n  {}", missing.join("\n  "));
    }

    let bytes = tables.to_bytes().expect("Failed to serialize game tables");
    fs::write(Path::new(&out_dir).join("game_data.bin"), bytes)
        .expect("Failed to write game_data.bin");

    let generated = Path::new(&out_dir).join("generated_data.rs");
    let mut file = BufWriter::new(fs::File::create(&generated).expect("Failed to create generated_data.rs"));

    let mut move_index = phf_codegen::Map::new();
    for (index, move_data) in tables.moves.iter().enumerate() {
        move_index.entry(move_data.id.as_str(), &index.to_string());
    }
    writeln!(
        file,
        "static MOVE_INDEX: phf::Map<&'static str, usize> = {};",
        move_index.build()
    )
    .expect("Failed to write move index");

    let mut species_index = phf_codegen::Map::new();
    for (index, species) in tables.species.iter().enumerate() {
        species_index.entry(species.name.as_str(), &index.to_string());
    }
    writeln!(
        file,
        "static SPECIES_INDEX: phf::Map<&'static str, usize> = {};",
        species_index.build()
    )
    .expect("Failed to write species index");
}

fn load_ron<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    ron::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}

// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_chapter(size: usize) -> String {
    let base = "# The Crossing\n\nElara waited by the **harbor** with [[character:Eldon]].\n\n- rope\n- lantern\n- a map of [[location:Crystal Cave]]\n\n---\n\n*Night* fell.\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn directory() -> storyloom_engine::EntitySnapshot {
    use storyloom_engine::Entity;
    storyloom_engine::EntitySnapshot::new(vec![
        Entity::new(1, "character", "Eldon"),
        Entity::new(2, "location", "Crystal Cave"),
    ])
}

use ghx_overlap_gen::{
    generator::{builder::GeneratorBuilder, RngMode},
    tiles::{TileDrawer, Training},
};

const ARROWS: &[&str] = &["→", "↑", "←", "↓"];

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // A small hand made training: a pipe loop around a patch of grass
    let mut training = Training::new(6, 6);
    for x in 0..6 {
        for y in 0..6 {
            training.place(x, y, "grass", 0);
        }
    }
    for i in 1..5 {
        training.place(i, 1, "pipe", 0);
        training.place(i, 4, "pipe", 0);
        training.place(1, i, "pipe", 1);
        training.place(4, i, "pipe", 1);
    }
    training.place(1, 1, "corner", 0);
    training.place(4, 1, "corner", 1);
    training.place(4, 4, "corner", 2);
    training.place(1, 4, "corner", 3);

    let compiled = training.compile().unwrap();
    if compiled.has_whitespace() {
        println!("Warning: the training has empty cells");
    }

    let mut seed = 12;
    let mut generator = GeneratorBuilder::new()
        .with_compiled_sample(&compiled)
        .with_pattern_size(3)
        .with_output_size(24, 12)
        .with_periodic_input(true)
        .with_rng(RngMode::Seeded(seed))
        .build()
        .unwrap();
    let mut drawer = TileDrawer::new(generator.grid());

    // Run a few observations per "frame" and draw what is already determined
    let mut frame = 0;
    while drawer.undrawn() {
        if !generator.run(seed, 8) {
            println!("Contradiction at frame {}, restarting", frame);
            seed += 1;
            generator.reinitialize();
            drawer.clear();
            continue;
        }
        let drawn = drawer.draw(&generator, &compiled);
        println!("Frame {}: {} new tiles", frame, drawn);
        frame += 1;
    }

    let rendering = drawer.rendering();
    for y in (0..rendering.grid().size_y()).rev() {
        for x in 0..rendering.grid().size_x() {
            match rendering.get_2d(x, y) {
                None => print!(" "),
                Some(tile) => match compiled.tile(tile.symbol) {
                    Some(entry) if entry.name == "grass" => print!("."),
                    Some(entry) if entry.name == "corner" => print!("+"),
                    _ => print!("{}", ARROWS[tile.rotation as usize]),
                },
            }
        }
        println!();
    }
}

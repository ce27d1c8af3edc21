use std::{
    io::{stdin, stdout, Write},
    thread, time,
};

use ghx_overlap_gen::{
    generator::{
        builder::GeneratorBuilder, observer::QueuedStatefulObserver, sample::Sample,
        GenerationStatus, GridNode, RngMode,
    },
    grid::GridData,
};

pub enum GenerationViewMode {
    StepByStep(u64),
    StepByStepPaused,
    Final,
}

const GENERATION_VIEW_MODE: GenerationViewMode = GenerationViewMode::Final;

const WATER: u8 = 1;
const SAND: u8 = 2;
const GRASS: u8 = 3;
const TREE: u8 = 4;

fn icon(symbol: u8) -> &'static str {
    match symbol {
        WATER => "🟦",
        SAND => "🟨",
        GRASS => "🟩",
        TREE => "🌲",
        _ => "⬛",
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let sample = Sample::from_rows(&[
        &[WATER, WATER, WATER, WATER, WATER, WATER, WATER, WATER],
        &[WATER, WATER, SAND, SAND, SAND, WATER, WATER, WATER],
        &[WATER, SAND, GRASS, GRASS, SAND, SAND, WATER, WATER],
        &[WATER, SAND, GRASS, TREE, GRASS, SAND, WATER, WATER],
        &[WATER, SAND, GRASS, GRASS, GRASS, SAND, WATER, WATER],
        &[WATER, WATER, SAND, GRASS, SAND, WATER, WATER, WATER],
        &[WATER, WATER, SAND, SAND, WATER, WATER, WATER, WATER],
        &[WATER, WATER, WATER, WATER, WATER, WATER, WATER, WATER],
    ]);

    let mut generator = GeneratorBuilder::new()
        .with_sample(sample)
        .with_pattern_size(3)
        .with_output_size(40, 16)
        .with_periodic_input(true)
        .with_periodic_output(true)
        .with_symmetry(8)
        .with_max_retry_count(20)
        .with_rng(RngMode::RandomSeed)
        .build()
        .unwrap();
    let mut observer = QueuedStatefulObserver::new(&mut generator);

    match GENERATION_VIEW_MODE {
        GenerationViewMode::Final => {
            let grid = generator.generate_grid().unwrap();
            println!("Final grid, seed {}:", generator.seed());
            for y in (0..grid.grid().size_y()).rev() {
                for x in 0..grid.grid().size_x() {
                    match grid.get_2d(x, y) {
                        None => print!("❓"),
                        Some(symbol) => print!("{}", icon(*symbol)),
                    }
                }
                println!();
            }
        }
        _ => {
            let mut step = 0;
            let mut done = false;
            while !done {
                match generator.select_and_propagate() {
                    Ok(status) => match status {
                        GenerationStatus::Ongoing => (),
                        GenerationStatus::Done => done = true,
                    },
                    Err(err) => {
                        println!("{}, retrying", err);
                        generator.reinitialize();
                    }
                }
                observer.dequeue_all();
                println!("Grid at iteration n°{}:", step);
                display_grid(observer.grid_data());
                match GENERATION_VIEW_MODE {
                    GenerationViewMode::StepByStep(delay) => {
                        thread::sleep(time::Duration::from_millis(delay));
                    }
                    GenerationViewMode::StepByStepPaused => pause(),
                    _ => (),
                }
                step += 1;
            }
        }
    }
}

fn display_grid(data_grid: &GridData<Option<GridNode>>) {
    for y in (0..data_grid.grid().size_y()).rev() {
        for x in 0..data_grid.grid().size_x() {
            match data_grid.get_2d(x, y) {
                None => print!("❓"),
                Some(node) => print!("{}", icon(node.symbol)),
            }
        }
        println!();
    }
}

fn pause() {
    let mut word = String::new();
    let mut stdout = stdout();
    stdout.write(b"Press Enter to continue").unwrap();
    stdout.flush().unwrap();
    stdin().read_line(&mut word).unwrap();
}

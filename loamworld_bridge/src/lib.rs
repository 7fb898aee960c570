// loamworld_bridge — background engine thread and renderer hand-off.
//
// The simulation itself is single-threaded; the only concurrent boundary in
// Loamworld is the one between the engine and whatever draws it. The engine
// thread owns the `Grid` outright, advances it at a fixed cadence, and after
// each completed tick publishes the full-grid colour frame under a mutex.
// A renderer never touches sim state: it clones the latest frame under the
// same lock and works from the copy. Frames are whole-tick snapshots — a
// reader can never observe a half-updated grid.
//
// Shutdown: `EngineHandle::stop()` flips an `Arc<AtomicBool>` and joins the
// thread. The flag is checked between ticks only; a tick always runs to
// completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use loamworld_sim::grid::Grid;
use loamworld_sim::types::Colour;
use serde::{Deserialize, Serialize};

/// One published render frame: the complete RGBA colour grid as of the end
/// of `tick`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ColourFrame {
    pub tick: u64,
    pub width: usize,
    pub depth: usize,
    pub height: usize,
    pub colours: Vec<Colour>,
}

impl ColourFrame {
    fn capture(grid: &Grid) -> Self {
        Self {
            tick: grid.tick(),
            width: grid.config().width,
            depth: grid.config().depth,
            height: grid.config().height,
            colours: grid.colours().to_vec(),
        }
    }
}

/// Options for starting the engine thread.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Pause between ticks. Zero runs the sim flat out.
    pub tick_interval: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
        }
    }
}

/// Handle returned by `start_engine` to observe and stop the running engine.
pub struct EngineHandle {
    keep_running: Arc<AtomicBool>,
    frame: Arc<Mutex<ColourFrame>>,
    thread: Option<thread::JoinHandle<Grid>>,
}

impl EngineHandle {
    /// Clone the most recently published frame.
    pub fn frame(&self) -> ColourFrame {
        match self.frame.lock() {
            Ok(frame) => frame.clone(),
            // A poisoned lock means the engine thread panicked mid-publish;
            // the last coherent frame is still the best answer available.
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Signal the engine to stop after its current tick and wait for it,
    /// returning the final grid state.
    pub fn stop(mut self) -> Option<Grid> {
        self.keep_running.store(false, Ordering::SeqCst);
        self.thread
            .take()
            .and_then(|handle| handle.join().ok())
    }
}

/// Start the engine on a background thread. The initial frame (tick 0) is
/// published before this returns, so `frame()` never yields an empty grid.
pub fn start_engine(grid: Grid, options: EngineOptions) -> EngineHandle {
    let keep_running = Arc::new(AtomicBool::new(true));
    let frame = Arc::new(Mutex::new(ColourFrame::capture(&grid)));

    let keep_running_clone = keep_running.clone();
    let frame_clone = frame.clone();
    let thread = thread::spawn(move || {
        run_engine(grid, options, keep_running_clone, frame_clone)
    });

    EngineHandle {
        keep_running,
        frame,
        thread: Some(thread),
    }
}

/// Engine loop. Runs until `keep_running` is set to false; returns the grid
/// so a caller can inspect (or persist) the final state after `stop`.
fn run_engine(
    mut grid: Grid,
    options: EngineOptions,
    keep_running: Arc<AtomicBool>,
    frame: Arc<Mutex<ColourFrame>>,
) -> Grid {
    while keep_running.load(Ordering::SeqCst) {
        grid.advance_tick();
        if let Ok(mut slot) = frame.lock() {
            *slot = ColourFrame::capture(&grid);
        }
        if !options.tick_interval.is_zero() {
            thread::sleep(options.tick_interval);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use loamworld_sim::SimConfig;

    fn test_grid() -> Grid {
        Grid::generate(SimConfig::default(), 42).unwrap()
    }

    #[test]
    fn initial_frame_is_available_immediately() {
        let grid = test_grid();
        let expected = grid.config().cell_count();
        let handle = start_engine(grid, EngineOptions::default());
        let frame = handle.frame();
        assert_eq!(frame.colours.len(), expected);
        handle.stop();
    }

    #[test]
    fn engine_advances_and_publishes_new_frames() {
        let handle = start_engine(
            test_grid(),
            EngineOptions {
                tick_interval: Duration::ZERO,
            },
        );
        let start = std::time::Instant::now();
        loop {
            if handle.frame().tick >= 3 {
                break;
            }
            assert!(
                start.elapsed() < Duration::from_secs(10),
                "engine never reached tick 3"
            );
            thread::yield_now();
        }
        handle.stop();
    }

    #[test]
    fn stop_joins_and_returns_the_final_grid() {
        let handle = start_engine(
            test_grid(),
            EngineOptions {
                tick_interval: Duration::ZERO,
            },
        );
        while handle.frame().tick == 0 {
            thread::yield_now();
        }
        let last_seen = handle.frame().tick;
        let grid = handle.stop().unwrap();
        assert!(grid.tick() >= last_seen);
    }

    #[test]
    fn frame_dimensions_match_the_config() {
        let config = SimConfig::default();
        let grid = Grid::generate(config.clone(), 1).unwrap();
        let handle = start_engine(grid, EngineOptions::default());
        let frame = handle.frame();
        assert_eq!(
            (frame.width, frame.depth, frame.height),
            (config.width, config.depth, config.height)
        );
        handle.stop();
    }
}

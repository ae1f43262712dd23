#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use proptest::prelude::*;
    use strum::VariantArray;

    use crate::config::{DistractorPolicy, LevelConfig, SimulationConfig};
    use crate::direction::Direction;
    use crate::generator::{generate_all_levels, Generator, Puzzle};
    use crate::grid::Grid;
    use crate::location::Location;
    use crate::obstacles::{shortest_route, SHORTCUT_RATIO};
    use crate::piece::{PieceKind, PieceType};
    use crate::simulator::{FlowSimulator, Leak, Status};

    const DT: f64 = 0.25;

    fn simulate(grid: &Grid, inlet_row: usize, outlet_row: usize) -> FlowSimulator {
        let mut sim = FlowSimulator::new();
        sim.start(grid, inlet_row, outlet_row).unwrap();
        sim.run(DT, 10_000);
        sim
    }

    fn assert_solution_reciprocated(puzzle: &Puzzle) {
        let solved = puzzle.solved_grid();
        for (location, piece) in &puzzle.solution {
            for direction in piece.openings().iter() {
                if (*location == puzzle.inlet() && direction == Direction::Left)
                    || (*location == puzzle.outlet() && direction == Direction::Right) {
                    continue;
                }
                let neighbor = solved.piece(direction.attempt_from(*location));
                assert!(neighbor.is_some_and(|p| p.opens(direction.invert())), "{:?} {:?}\n{}", location, direction, solved);
            }
        }
    }

    #[test]
    fn example_straight_run() {
        let mut grid = Grid::with_dims((NonZero::new(7).unwrap(), NonZero::new(7).unwrap()));
        for col in 0..7 {
            assert!(grid.place_piece(Location(3, col), PieceType::Horizontal));
        }
        assert_eq!(format!("{}", grid), ".......
.......
.......
═══════
.......
.......
.......
");

        let config = SimulationConfig::default();
        let mut sim = FlowSimulator::with_config(config);
        sim.start(&grid, 3, 3).unwrap();
        assert_eq!(sim.run(DT, 10_000), Status::Success);
        assert!(sim.leaks().is_empty());
        // whole ticks only, so allow one tick of slack per segment
        let expected = 9.0 / config.fill_rate;
        assert!(sim.elapsed() >= expected && sim.elapsed() <= expected + 9.0 * DT, "{}", sim.elapsed());
    }

    #[test]
    fn example_gap_in_the_run() {
        let mut grid = Grid::with_dims((NonZero::new(7).unwrap(), NonZero::new(7).unwrap()));
        for col in (0..7).filter(|col| *col != 3) {
            grid.place_piece(Location(3, col), PieceType::Horizontal);
        }

        let sim = simulate(&grid, 3, 3);
        assert_eq!(sim.status(), Status::LeakFail);
        assert_eq!(sim.leaks(), &[Leak { location: Location(3, 2), direction: Direction::Right }]);
        assert!(sim.leak_timer() >= crate::LEAK_TIMEOUT);
    }

    #[test]
    fn campaign_levels_are_solvable() {
        let puzzles = Generator::from_seed(2024).generate_all(&LevelConfig::campaign());
        assert_eq!(puzzles.len(), 5);

        for puzzle in &puzzles {
            assert!(shortest_route(&puzzle.grid, puzzle.inlet(), puzzle.outlet()).is_some());
            assert_solution_reciprocated(puzzle);

            let sim = simulate(&puzzle.solved_grid(), puzzle.inlet_row, puzzle.outlet_row);
            assert_eq!(sim.status(), Status::Success, "\n{}", puzzle.solved_grid());
            assert!(sim.leaks().is_empty());
        }
    }

    #[test]
    fn looped_levels_carry_tees() {
        let config = LevelConfig { loop_count: 1, require_all_loops: true, ..LevelConfig::hard() };
        let puzzle = Generator::from_seed(77).generate(&config);
        if !puzzle.fallback {
            let tees = puzzle.solution.iter().filter(|(_, piece)| piece.kind() == PieceKind::Tee).count();
            assert_eq!(tees, 2);
        }
        let sim = simulate(&puzzle.solved_grid(), puzzle.inlet_row, puzzle.outlet_row);
        assert_eq!(sim.status(), Status::Success);
    }

    #[test]
    fn restarting_a_puzzle_keeps_obstacles() {
        let puzzle = Generator::from_seed(5).generate(&LevelConfig::easy());
        let mut grid = puzzle.solved_grid();
        let obstacles = grid.obstacles().collect::<Vec<_>>();

        let mut sim = FlowSimulator::new();
        sim.start(&grid, puzzle.inlet_row, puzzle.outlet_row).unwrap();
        assert_eq!(sim.run(DT, 10_000), Status::Success);

        grid.clear_pieces();
        assert_eq!(grid, puzzle.grid);
        assert_eq!(grid.obstacles().collect::<Vec<_>>(), obstacles);

        // same arrangement again after a reset
        sim.reset();
        sim.start(&puzzle.solved_grid(), puzzle.inlet_row, puzzle.outlet_row).unwrap();
        assert_eq!(sim.run(DT, 10_000), Status::Success);
    }

    #[test]
    fn placing_from_the_manifest() {
        let puzzle = Generator::from_seed(9).generate(&LevelConfig::medium());
        let mut inventory = puzzle.manifest.clone();
        let mut grid = puzzle.grid.clone();

        for (location, piece) in &puzzle.solution {
            assert!(inventory.take(*piece));
            assert!(grid.place_piece(*location, *piece));
        }
        assert_eq!(grid, puzzle.solved_grid());
        assert_eq!(inventory.total(), puzzle.manifest.total() - puzzle.solution.len());
    }

    #[test]
    fn hard_levels_have_no_trivial_shortcut() {
        let config = LevelConfig::hard();
        assert!(config.reject_trivial_shortcut);

        for seed in 0..24 {
            let puzzle = Generator::from_seed(seed).generate(&config);
            if puzzle.fallback {
                continue;
            }
            let shortest = shortest_route(&puzzle.grid, puzzle.inlet(), puzzle.outlet()).unwrap();
            assert!(shortest as f64 >= SHORTCUT_RATIO * puzzle.path_len as f64, "seed {}: {} vs {}", seed, shortest, puzzle.path_len);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn generated_puzzles_hold_their_invariants(seed in any::<u64>(), tier in 0usize..5) {
            let config = LevelConfig::campaign()[tier].clone();
            let puzzle = Generator::from_seed(seed).generate(&config);

            // solvable by plain reachability
            let shortest = shortest_route(&puzzle.grid, puzzle.inlet(), puzzle.outlet());
            prop_assert!(shortest.is_some());
            if config.reject_trivial_shortcut && !puzzle.fallback {
                let shortest = shortest.unwrap_or_default();
                prop_assert!(shortest as f64 >= SHORTCUT_RATIO * puzzle.path_len as f64, "{} vs {}", shortest, puzzle.path_len);
            }
            // no orphan junctions: every network cell is a catalog piece on an open cell
            for (location, piece) in &puzzle.solution {
                prop_assert!(!puzzle.grid.is_obstacle(*location));
                prop_assert_eq!(PieceType::from_openings(piece.openings()), Some(*piece));
            }
            // decoys never introduce new types
            let solution_types = puzzle.solution.iter().map(|(_, piece)| *piece).collect::<Vec<_>>();
            for (piece, _) in puzzle.manifest.iter() {
                prop_assert!(solution_types.contains(&piece));
            }
            prop_assert!(puzzle.manifest.total() >= puzzle.solution.len());

            let sim = simulate(&puzzle.solved_grid(), puzzle.inlet_row, puzzle.outlet_row);
            prop_assert_eq!(sim.status(), Status::Success);
            prop_assert!(sim.leaks().is_empty());
        }

        #[test]
        fn leak_timeout_is_never_early(gap in 1usize..6, ticks_per_unit in 1u32..5) {
            let dt = 1.0 / f64::from(1u32 << ticks_per_unit);
            let mut grid = Grid::with_dims((NonZero::new(7).unwrap(), NonZero::new(7).unwrap()));
            for col in (0..7).filter(|col| *col != gap) {
                grid.place_piece(Location(2, col), PieceType::Horizontal);
            }
            let mut sim = FlowSimulator::with_config(SimulationConfig { fill_rate: 1.0, leak_timeout: 2.0 });
            sim.start(&grid, 2, 2).unwrap();

            let mut leaking_for = 0.0;
            loop {
                let status = sim.update(dt);
                if !sim.leaks().is_empty() {
                    leaking_for += dt;
                }
                if leaking_for >= 2.0 {
                    prop_assert_eq!(status, Status::LeakFail);
                    break;
                }
                prop_assert_eq!(status, Status::None);
            }
            prop_assert_eq!(sim.leaks(), &[Leak { location: Location(2, gap - 1), direction: Direction::Right }]);
        }
    }

    #[test]
    fn every_catalog_piece_leaks_on_an_open_board() {
        // a lone piece in the inlet cell: every opening but the entry faces nothing
        for piece in PieceType::VARIANTS.iter().filter(|piece| piece.opens(Direction::Left)) {
            let mut grid = Grid::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()));
            grid.place_piece(Location(1, 0), *piece);

            let sim = simulate(&grid, 1, 1);
            assert_eq!(sim.status(), Status::LeakFail);
            let leaked = sim.leaks().iter().map(|leak| leak.direction).collect::<Vec<_>>();
            assert_eq!(leaked, piece.exits_for(Direction::Left).iter().collect::<Vec<_>>(), "{:?}", piece);
            assert!(sim.leaks().iter().all(|leak| leak.location == Location(1, 0)));
        }
    }

    #[test]
    fn free_function_matches_generator() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let configs = vec![LevelConfig { distractor_policy: DistractorPolicy::Percent(50), ..LevelConfig::medium() }; 3];
        let a = generate_all_levels(&configs, &mut StdRng::seed_from_u64(31));
        let b = Generator::with_rng(StdRng::seed_from_u64(31)).generate_all(&configs);
        assert_eq!(a, b);
    }
}

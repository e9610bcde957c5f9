use genetrain::genome::Genome;
use genetrain::population::Population;
use genetrain::rng::RandomNumberGenerator;
use genetrain::selection::{
    AdjustedScoreComparator, SelectionStrategy, TournamentSelection,
};
use genetrain::selector::{GenomeSelector, ThreadedSelector};

#[derive(Clone, Debug)]
struct ScoredGenome {
    adjusted: f64,
}

impl Genome for ScoredGenome {
    fn score(&self) -> f64 {
        self.adjusted
    }

    fn set_score(&mut self, score: f64) {
        self.adjusted = score;
    }

    fn adjusted_score(&self) -> f64 {
        self.adjusted
    }

    fn set_adjusted_score(&mut self, score: f64) {
        self.adjusted = score;
    }

    fn size(&self) -> usize {
        1
    }

    fn copy_from(&mut self, other: &Self) {
        self.adjusted = other.adjusted;
    }
}

fn population(scores: &[f64]) -> Population<ScoredGenome> {
    let genomes = scores
        .iter()
        .map(|&adjusted| ScoredGenome { adjusted })
        .collect();
    Population::new(genomes, 10).unwrap()
}

#[test]
fn test_tournament_prefers_better_slots() {
    let population = population(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    let comparator = AdjustedScoreComparator::maximizing();
    let tournament = TournamentSelection::new(4).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(1);

    let mut selected_total = 0.0;
    let mut anti_total = 0.0;
    let draws = 200;
    for _ in 0..draws {
        let winner = tournament.select(&population, &comparator, &mut rng).unwrap();
        let loser = tournament
            .anti_select(&population, &comparator, &mut rng)
            .unwrap();
        selected_total += population.get(winner).adjusted_score();
        anti_total += population.get(loser).adjusted_score();
    }

    // Selection pressure: parents average clearly better than victims.
    assert!(selected_total / draws as f64 > anti_total / draws as f64);
}

#[test]
fn test_minimizing_comparator_flips_direction() {
    let population = population(&[1.0, 9.0]);
    let comparator = AdjustedScoreComparator::minimizing();
    let tournament = TournamentSelection::new(32).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(2);

    let winner = tournament.select(&population, &comparator, &mut rng).unwrap();
    assert_eq!(winner, 0);

    let loser = tournament
        .anti_select(&population, &comparator, &mut rng)
        .unwrap();
    assert_eq!(loser, 1);
}

#[test]
fn test_threaded_selector_round_trip() {
    let population = population(&[4.0, 1.0, 9.0, 6.0]);
    let selector = ThreadedSelector::new(
        Box::new(TournamentSelection::default()),
        Box::new(AdjustedScoreComparator::maximizing()),
        RandomNumberGenerator::from_seed(3),
    );

    // Hand out every slot, release them all, then hand out again.
    let first_round: Vec<usize> = (0..4)
        .map(|_| selector.anti_select_slot(&population).unwrap())
        .collect();
    for &slot in &first_round {
        selector.release_slot(slot);
    }
    for _ in 0..4 {
        selector.anti_select_slot(&population).unwrap();
    }
}

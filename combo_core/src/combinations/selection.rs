//! Enumeration of accompanying action sets.
//!
//! For a fixed part of a combination (permanent actions, the leading action,
//! the accidental or seismic action) the variable actions that accompany it
//! are chosen as the **maximal** sets that
//!
//! 1. are pairwise compatible and compatible with the fixed part, and
//! 2. contain, for every member that declares main actions, at least one of
//!    them (or the main is part of the fixed part).
//!
//! Compatible sets are the maximal cliques of the compatibility graph, found
//! with Bron–Kerbosch with pivoting. Each clique is then closed under the
//! main relation: members without a main are dropped until stable, after
//! which compatible pool actions whose mains are present are added back
//! until stable. Output is sorted by registration index so that generation
//! order does not depend on the clique search order.

use std::collections::BTreeSet;

use crate::actions::ResolvedRelations;

/// Maximal accompanying sets for a fixed part `base`.
///
/// `candidates` are registration indices of the actions that may accompany
/// (members of `base` are skipped). Returns at least one set; an empty pool
/// yields a single empty set.
pub fn accompanying_sets(relations: &ResolvedRelations, base: &[usize], candidates: &[usize]) -> Vec<Vec<usize>> {
    let mut pool: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|c| !base.contains(c) && relations.compatible_with_all(*c, base))
        .collect();
    pool.sort_unstable();
    pool.dedup();

    // Drop actions whose mains can never be present
    loop {
        let unreachable: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&c| !relations.mains_satisfied(c, |m| base.contains(&m) || pool.contains(&m)))
            .collect();
        if unreachable.is_empty() {
            break;
        }
        pool.retain(|c| !unreachable.contains(c));
    }

    let cliques = maximal_cliques(&pool, |a, b| relations.compatible(a, b));

    let mut sets: Vec<Vec<usize>> = cliques
        .into_iter()
        .map(|clique| close_under_mains(relations, base, &pool, clique))
        .collect();
    sets.sort();
    sets.dedup();

    let all = sets.clone();
    sets.retain(|s| !all.iter().any(|other| other.len() > s.len() && is_subset(s, other)));
    sets
}

/// Remove members lacking a main, then add back whatever fits.
fn close_under_mains(relations: &ResolvedRelations, base: &[usize], pool: &[usize], mut set: Vec<usize>) -> Vec<usize> {
    loop {
        let orphans: Vec<usize> = set
            .iter()
            .copied()
            .filter(|&c| !relations.mains_satisfied(c, |m| base.contains(&m) || set.contains(&m)))
            .collect();
        if orphans.is_empty() {
            break;
        }
        set.retain(|c| !orphans.contains(c));
    }

    loop {
        let addition = pool.iter().copied().find(|&c| {
            !set.contains(&c)
                && relations.compatible_with_all(c, &set)
                && relations.mains_satisfied(c, |m| base.contains(&m) || set.contains(&m))
        });
        match addition {
            Some(c) => set.push(c),
            None => break,
        }
    }

    set.sort_unstable();
    set
}

fn is_subset(small: &[usize], large: &[usize]) -> bool {
    small.iter().all(|x| large.contains(x))
}

/// All maximal cliques of the graph on `vertices` with edges `adjacent`.
///
/// Each clique is returned sorted; an empty vertex list yields one empty
/// clique.
pub fn maximal_cliques(vertices: &[usize], adjacent: impl Fn(usize, usize) -> bool) -> Vec<Vec<usize>> {
    let edge = |a: usize, b: usize| a != b && adjacent(a, b);
    let mut cliques = Vec::new();
    let mut current = Vec::new();
    bron_kerbosch(
        &mut current,
        vertices.iter().copied().collect(),
        BTreeSet::new(),
        &edge,
        &mut cliques,
    );
    cliques
}

fn bron_kerbosch(
    current: &mut Vec<usize>,
    mut candidates: BTreeSet<usize>,
    mut excluded: BTreeSet<usize>,
    edge: &dyn Fn(usize, usize) -> bool,
    cliques: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        let mut clique = current.clone();
        clique.sort_unstable();
        cliques.push(clique);
        return;
    }

    let pivot = candidates
        .iter()
        .chain(excluded.iter())
        .copied()
        .max_by_key(|&u| candidates.iter().filter(|&&v| edge(u, v)).count());

    let branch: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&v| pivot.map_or(true, |u| !edge(u, v)))
        .collect();

    for v in branch {
        current.push(v);
        let next_candidates = candidates.iter().copied().filter(|&w| edge(v, w)).collect();
        let next_excluded = excluded.iter().copied().filter(|&w| edge(v, w)).collect();
        bron_kerbosch(current, next_candidates, next_excluded, edge, cliques);
        current.pop();
        candidates.remove(&v);
        excluded.insert(v);
    }
}

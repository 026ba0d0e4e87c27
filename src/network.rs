// src/network.rs
//! Сеть дорог между поселениями
//!
//! Каждое поселение соединяется с ближайшим и самым дальним соседом (по евклидову расстоянию).
//! Совпадающие ломаные разных пар не объединяются. Граф дорог хранит одно ребро на пару.

use crate::error::GenError;
use crate::grid::{Coord, SpatialGrid};
use crate::pathfinding::{FrontierSelection, find_path, polyline_length};
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct PathNetwork {
    /// Все проложенные ломаные, включая повторы
    pub paths: Vec<Vec<Coord>>,
    /// Пары, между которыми не нашлось пути
    pub failures: Vec<GenError>,
    /// Узлы — поселения в исходном порядке, вес ребра — длина ломаной
    pub roads: UnGraph<Coord, f32>,
}

/// Индексы ближайшего и самого дальнего другого поселения. При равенстве берётся первый.
fn nearest_and_farthest(settlements: &[Coord], i: usize) -> Option<(usize, usize)> {
    let origin = settlements[i];
    let mut nearest: Option<(usize, f32)> = None;
    let mut farthest: Option<(usize, f32)> = None;

    for (j, &other) in settlements.iter().enumerate() {
        if j == i {
            continue;
        }
        let d = origin.distance(other);
        if nearest.is_none_or(|(_, best)| d < best) {
            nearest = Some((j, d));
        }
        if farthest.is_none_or(|(_, best)| d > best) {
            farthest = Some((j, d));
        }
    }

    Some((nearest?.0, farthest?.0))
}

/// Прокладывает дороги. При числе поселений меньше двух возвращает пустую сеть.
#[must_use]
pub fn build_path_network(
    grid: &SpatialGrid,
    settlements: &[Coord],
    selection: FrontierSelection,
) -> PathNetwork {
    let mut network = PathNetwork::default();
    if settlements.len() < 2 {
        return network;
    }

    let nodes: Vec<NodeIndex> = settlements
        .iter()
        .map(|&s| network.roads.add_node(s))
        .collect();

    for (i, &from) in settlements.iter().enumerate() {
        let Some((nearest, farthest)) = nearest_and_farthest(settlements, i) else {
            continue;
        };

        for j in [nearest, farthest] {
            let to = settlements[j];
            match find_path(grid, from, to, selection) {
                Ok(path) => {
                    network
                        .roads
                        .update_edge(nodes[i], nodes[j], polyline_length(&path));
                    network.paths.push(path);
                }
                Err(err) => {
                    warn!("Дорога не проложена: {}", err);
                    network.failures.push(err);
                }
            }
        }
    }

    info!(
        "Дороги: {} ломаных, {} пар в графе, неудач {}",
        network.paths.len(),
        network.roads.edge_count(),
        network.failures.len()
    );
    network
}

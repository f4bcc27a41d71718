//! Generation filters, one struct per graph flavor.
//!
//! Each struct doubles as the cache key of its flavor and knows the store
//! entry name it is persisted under. `None` means "no filter".

use serde::{Deserialize, Serialize};

/// Filters for undirected graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UndirectedOptions {
    pub connected: bool,
    pub biconnected: bool,
    pub min_degree: usize,
    /// Keep only graphs whose odd-automorphism flag equals this value.
    pub has_odd_automorphism: Option<bool>,
}

impl UndirectedOptions {
    /// The filters a graph complex basis uses: no odd automorphisms.
    pub fn even(connected: bool, biconnected: bool, min_degree: usize) -> Self {
        Self { connected, biconnected, min_degree, has_odd_automorphism: Some(false) }
    }

    /// Same structural filters, parity unrestricted.
    pub fn underlying(&self) -> Self {
        Self { has_odd_automorphism: None, ..self.clone() }
    }

    pub fn entry_name(&self, num_vertices: usize, num_edges: usize) -> String {
        entry_name('u', num_vertices, num_edges, self, None)
    }
}

/// Filters for directed graphs. `loops` refers to 2-cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedOptions {
    pub connected: bool,
    pub biconnected: bool,
    pub min_degree: usize,
    pub loops: Option<bool>,
    pub has_odd_automorphism: Option<bool>,
}

impl DirectedOptions {
    pub fn even(connected: bool, biconnected: bool, min_degree: usize, loops: Option<bool>) -> Self {
        Self { connected, biconnected, min_degree, loops, has_odd_automorphism: Some(false) }
    }

    /// Options of the undirected list the orientations are taken from.
    pub fn underlying(&self) -> UndirectedOptions {
        UndirectedOptions {
            connected: self.connected,
            biconnected: self.biconnected,
            min_degree: self.min_degree,
            has_odd_automorphism: None,
        }
    }

    /// Options of the undirected list the orientation records index into.
    pub fn undirected(&self) -> UndirectedOptions {
        UndirectedOptions { has_odd_automorphism: self.has_odd_automorphism, ..self.underlying() }
    }

    /// 2-cycles are allowed unless explicitly excluded.
    pub fn allows_loops(&self) -> bool {
        self.loops != Some(false)
    }

    pub fn entry_name(&self, num_vertices: usize, num_edges: usize) -> String {
        entry_name('d', num_vertices, num_edges, &self.undirected(), Some(self.loops))
    }
}

fn entry_name(
    prefix: char,
    num_vertices: usize,
    num_edges: usize,
    options: &UndirectedOptions,
    loops: Option<Option<bool>>,
) -> String {
    let mut name = format!("{prefix}_{num_vertices}_{num_edges}");
    if options.connected {
        name.push_str("_c");
    }
    if options.biconnected {
        name.push_str("_bc");
    }
    if options.min_degree != 0 {
        name.push_str(&format!("_m{}", options.min_degree));
    }
    if let Some(Some(loops)) = loops {
        name.push_str(if loops { "_loops" } else { "_noloops" });
    }
    if let Some(odd) = options.has_odd_automorphism {
        name.push_str(if odd { "_odd" } else { "_even" });
    }
    name.push_str(".db");
    name
}

/// Filters for formality graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormalityOptions {
    pub connected: Option<bool>,
    /// Exact maximum out-degree.
    pub max_out_degree: Option<usize>,
    /// Number of vertices attaining the maximum out-degree.
    pub num_verts_of_max_out_degree: Option<usize>,
    pub sorted_out_degrees: Option<Vec<usize>>,
    pub max_aerial_in_degree: Option<usize>,
    pub loops: Option<bool>,
    pub prime: Option<bool>,
    pub has_odd_automorphism: Option<bool>,
    pub positive_differential_order: Option<bool>,
    /// Generate one representative per orbit of ground permutations.
    pub mod_ground_permutations: bool,
}

impl FormalityOptions {
    pub fn allows_loops(&self) -> bool {
        self.loops != Some(false)
    }

    pub fn entry_name(&self, num_ground: usize, num_aerial: usize, num_edges: usize) -> String {
        let mut name = format!("f_{num_ground}_{num_aerial}_{num_edges}");
        if let Some(connected) = self.connected {
            name.push_str(if connected { "_c" } else { "_nc" });
        }
        if let Some(d) = self.max_out_degree {
            name.push_str(&format!("_D{d}"));
        }
        if let Some(m) = self.num_verts_of_max_out_degree {
            name.push_str(&format!("_M{m}"));
        }
        if let Some(u) = self.max_aerial_in_degree {
            name.push_str(&format!("_U{u}"));
        }
        if let Some(degrees) = &self.sorted_out_degrees {
            let joined: Vec<String> = degrees.iter().map(ToString::to_string).collect();
            name.push_str(&format!("_sod_{}", joined.join("_")));
        }
        if let Some(loops) = self.loops {
            name.push_str(if loops { "_loops" } else { "_noloops" });
        }
        if let Some(prime) = self.prime {
            name.push_str(if prime { "_prime" } else { "_composite" });
        }
        if let Some(odd) = self.has_odd_automorphism {
            name.push_str(if odd { "_odd" } else { "_even" });
        }
        if let Some(pdo) = self.positive_differential_order {
            name.push_str(if pdo { "_pdo" } else { "_npdo" });
        }
        if self.mod_ground_permutations {
            name.push_str("_modground");
        }
        name.push_str(".db");
        name
    }
}

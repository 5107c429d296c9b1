//! Deterministic palette quantization in rgba4444 space with one-bit alpha.
//!
//! Opaque colors are binned on their top four bits per channel, then bins are merged with
//! pairwise nearest-neighbour clustering until they fit the palette. Index 0 is always the
//! fully transparent entry; pixels with alpha at or below the threshold map to it.

/// Palette index reserved for fully transparent pixels.
pub const TRANSPARENT_INDEX: u8 = 0;

/// Largest palette a GIF frame can carry.
pub const MAX_PALETTE_COLORS: usize = 256;

/// Alpha values at or below this are treated as transparent.
pub const ALPHA_THRESHOLD: u8 = 127;

const BIN_COUNT: usize = 1 << 12;
const NO_ENTRY: u16 = u16::MAX;

/// Quantized palette; entry 0 is transparent, the rest are opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
    // Palette index for every rgba4444 bin seen while quantizing, NO_ENTRY otherwise.
    bins: Vec<u16>,
}

impl Palette {
    /// All entries as RGBA.
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Number of entries, including the transparent one.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries. Never true for palettes built by [`quantize`].
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the first fully transparent entry.
    pub fn transparent_index(&self) -> u8 {
        self.colors
            .iter()
            .position(|c| c[3] == 0)
            .map_or(TRANSPARENT_INDEX, |i| i as u8)
    }

    /// Packed RGB triples, the layout GIF color tables use.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct Cluster {
    n: f64,
    r: f64,
    g: f64,
    b: f64,
    nn: usize,
    cost: f64,
    alive: bool,
}

fn bin_key(r: u8, g: u8, b: u8) -> usize {
    ((r as usize >> 4) << 8) | ((g as usize >> 4) << 4) | (b as usize >> 4)
}

fn is_opaque(a: u8) -> bool {
    a > ALPHA_THRESHOLD
}

fn merge_cost(a: &Cluster, b: &Cluster) -> f64 {
    let dr = a.r - b.r;
    let dg = a.g - b.g;
    let db = a.b - b.b;
    (a.n * b.n / (a.n + b.n)) * (dr * dr + dg * dg + db * db)
}

fn find_nearest(clusters: &mut [Cluster], i: usize) {
    let mut best = (usize::MAX, f64::INFINITY);
    for (j, other) in clusters.iter().enumerate() {
        if j == i || !other.alive {
            continue;
        }
        let cost = merge_cost(&clusters[i], other);
        if cost < best.1 {
            best = (j, cost);
        }
    }
    clusters[i].nn = best.0;
    clusters[i].cost = best.1;
}

/// Build a palette of at most `max_colors` entries (one of them transparent) for an RGBA8
/// buffer. Equal input always yields an equal palette.
pub fn quantize(rgba: &[u8], max_colors: usize) -> Palette {
    let max_colors = max_colors.clamp(1, MAX_PALETTE_COLORS);

    let mut counts = vec![0u64; BIN_COUNT];
    let mut sums = vec![[0u64; 3]; BIN_COUNT];
    for px in rgba.chunks_exact(4) {
        if !is_opaque(px[3]) {
            continue;
        }
        let key = bin_key(px[0], px[1], px[2]);
        counts[key] += 1;
        sums[key][0] += u64::from(px[0]);
        sums[key][1] += u64::from(px[1]);
        sums[key][2] += u64::from(px[2]);
    }

    let keys: Vec<usize> = (0..BIN_COUNT).filter(|&k| counts[k] > 0).collect();
    let mut clusters: Vec<Cluster> = keys
        .iter()
        .map(|&k| {
            let s = sums[k];
            let nf = counts[k] as f64;
            Cluster {
                n: nf,
                r: s[0] as f64 / nf,
                g: s[1] as f64 / nf,
                b: s[2] as f64 / nf,
                nn: usize::MAX,
                cost: f64::INFINITY,
                alive: true,
            }
        })
        .collect();
    let mut merged_into: Vec<usize> = (0..clusters.len()).collect();

    let budget = max_colors - 1;
    let mut alive = clusters.len();
    if budget == 0 {
        clusters.clear();
        alive = 0;
    } else if alive > budget {
        for i in 0..clusters.len() {
            find_nearest(&mut clusters, i);
        }
        while alive > budget {
            let mut i = usize::MAX;
            let mut best = f64::INFINITY;
            for (k, c) in clusters.iter().enumerate() {
                if c.alive && c.cost < best {
                    best = c.cost;
                    i = k;
                }
            }
            if i == usize::MAX {
                break;
            }
            let j = clusters[i].nn;

            let (a, b) = (clusters[i], clusters[j]);
            let n = a.n + b.n;
            clusters[i].r = (a.r * a.n + b.r * b.n) / n;
            clusters[i].g = (a.g * a.n + b.g * b.n) / n;
            clusters[i].b = (a.b * a.n + b.b * b.n) / n;
            clusters[i].n = n;
            clusters[j].alive = false;
            merged_into[j] = i;
            alive -= 1;

            find_nearest(&mut clusters, i);
            for k in 0..clusters.len() {
                if k == i || !clusters[k].alive {
                    continue;
                }
                if clusters[k].nn == i || clusters[k].nn == j {
                    find_nearest(&mut clusters, k);
                } else {
                    let cost = merge_cost(&clusters[k], &clusters[i]);
                    if cost < clusters[k].cost {
                        clusters[k].nn = i;
                        clusters[k].cost = cost;
                    }
                }
            }
        }
    }

    let mut colors = Vec::with_capacity(alive + 1);
    colors.push([0, 0, 0, 0]);
    let mut slot = vec![NO_ENTRY; clusters.len()];
    for (k, c) in clusters.iter().enumerate().filter(|(_, c)| c.alive) {
        slot[k] = colors.len() as u16;
        colors.push([
            c.r.round().clamp(0.0, 255.0) as u8,
            c.g.round().clamp(0.0, 255.0) as u8,
            c.b.round().clamp(0.0, 255.0) as u8,
            255,
        ]);
    }

    let mut bins = vec![NO_ENTRY; BIN_COUNT];
    if !clusters.is_empty() {
        for (start, &key) in keys.iter().enumerate() {
            let mut k = start;
            while merged_into[k] != k {
                k = merged_into[k];
            }
            bins[key] = slot[k];
        }
    }
    Palette { colors, bins }
}

/// Map every pixel to a palette index.
///
/// Transparent pixels map to the transparent entry. Opaque pixels map to the entry their
/// rgba4444 bin was merged into; bins the palette never saw fall back to the nearest opaque
/// entry (lowest index wins ties).
pub fn apply_palette(rgba: &[u8], palette: &Palette) -> Vec<u8> {
    let transparent = palette.transparent_index();
    let mut cache = palette.bins.clone();
    cache.resize(BIN_COUNT, NO_ENTRY);
    let mut out = Vec::with_capacity(rgba.len() / 4);

    for px in rgba.chunks_exact(4) {
        if !is_opaque(px[3]) {
            out.push(transparent);
            continue;
        }
        let key = bin_key(px[0], px[1], px[2]);
        if cache[key] == NO_ENTRY {
            cache[key] = u16::from(nearest_opaque(palette, key).unwrap_or(transparent));
        }
        out.push(cache[key] as u8);
    }
    out
}

fn nearest_opaque(palette: &Palette, key: usize) -> Option<u8> {
    let expand = |v: usize| ((v & 0xF) * 17) as i32;
    let (r, g, b) = (expand(key >> 8), expand(key >> 4), expand(key));

    let mut best: Option<(u8, i32)> = None;
    for (idx, c) in palette.colors().iter().enumerate() {
        if c[3] == 0 {
            continue;
        }
        let dr = i32::from(c[0]) - r;
        let dg = i32::from(c[1]) - g;
        let db = i32::from(c[2]) - b;
        let d = dr * dr + dg * dg + db * db;
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((idx as u8, d));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/quantize.rs"]
mod tests;

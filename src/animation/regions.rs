/// A named point of interest visited by the scan animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Region {
    /// Center of the view in the complex plane.
    pub center: (f64, f64),
    /// Fixed magnification for this region.
    pub zoom: f64,
    /// Human-readable name used in logs.
    pub label: &'static str,
}

/// Scan traversal order. Frame `i * per_region + j` belongs to `CATALOG[i]`, so reordering
/// entries changes the output video.
pub const CATALOG: [Region; 6] = [
    Region {
        center: (-0.7269, 0.1889),
        zoom: 100.0,
        label: "spiral",
    },
    Region {
        center: (-0.8, 0.156),
        zoom: 200.0,
        label: "lightning",
    },
    Region {
        center: (-0.16, 1.0405),
        zoom: 150.0,
        label: "seahorse valley",
    },
    Region {
        center: (-1.25066, 0.02012),
        zoom: 300.0,
        label: "mini island",
    },
    Region {
        center: (-0.749, 0.1102),
        zoom: 400.0,
        label: "tendrils",
    },
    Region {
        center: (0.3, 0.5),
        zoom: 80.0,
        label: "right branch",
    },
];

/// The built-in catalog in traversal order.
pub fn catalog() -> &'static [Region] {
    &CATALOG
}

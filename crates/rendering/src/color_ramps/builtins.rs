// ---------------------------------------------------------------------------
// Built-in, read-only ramps
// ---------------------------------------------------------------------------
//
// The perceptually uniform ramps are eight evenly spaced samples of the
// matplotlib colormaps of the same name.

use bevy::color::Srgba;

use super::ramp::ColorRamp;

/// Ramp used when no gradient, or an unknown one, is configured.
pub const DEFAULT_RAMP: &str = "cividis";

pub const GREEN: Srgba = Srgba::rgb(0.0, 1.0, 0.0);
pub const RED: Srgba = Srgba::rgb(1.0, 0.0, 0.0);
pub const BLUE: Srgba = Srgba::rgb(0.0, 0.0, 1.0);

const VIRIDIS: [[f32; 3]; 8] = [
    [0.267004, 0.004874, 0.329415],
    [0.275191, 0.194905, 0.496005],
    [0.212395, 0.359683, 0.551710],
    [0.153364, 0.497000, 0.557724],
    [0.122312, 0.633153, 0.530398],
    [0.288921, 0.758394, 0.428426],
    [0.626579, 0.854645, 0.223353],
    [0.993248, 0.906157, 0.143936],
];

// Blue-to-yellow, readable with red-green color vision deficiency
const CIVIDIS: [[f32; 3]; 8] = [
    [0.000000, 0.135112, 0.304751],
    [0.130669, 0.231458, 0.432840],
    [0.298421, 0.332247, 0.423973],
    [0.425120, 0.431334, 0.447692],
    [0.555393, 0.537807, 0.471147],
    [0.695985, 0.648334, 0.440072],
    [0.849223, 0.771947, 0.359729],
    [0.995737, 0.909344, 0.217772],
];

const PLASMA: [[f32; 3]; 8] = [
    [0.050383, 0.029803, 0.527975],
    [0.325150, 0.006915, 0.639512],
    [0.546157, 0.038954, 0.647010],
    [0.723444, 0.196158, 0.538981],
    [0.859750, 0.360588, 0.406917],
    [0.955470, 0.533093, 0.285490],
    [0.994495, 0.740880, 0.166335],
    [0.940015, 0.975158, 0.131326],
];

const INFERNO: [[f32; 3]; 8] = [
    [0.001462, 0.000466, 0.013866],
    [0.155850, 0.044559, 0.325338],
    [0.397674, 0.083257, 0.433183],
    [0.621685, 0.164184, 0.388781],
    [0.832299, 0.283913, 0.257383],
    [0.961293, 0.488716, 0.084289],
    [0.981173, 0.759135, 0.156863],
    [0.988362, 0.998364, 0.644924],
];

const MAGMA: [[f32; 3]; 8] = [
    [0.001462, 0.000466, 0.013866],
    [0.135053, 0.068391, 0.315000],
    [0.372116, 0.092816, 0.499053],
    [0.594508, 0.175701, 0.501241],
    [0.828886, 0.262229, 0.430644],
    [0.973381, 0.461520, 0.361965],
    [0.997341, 0.733545, 0.505167],
    [0.987053, 0.991438, 0.749504],
];

fn colors(points: &[[f32; 3]]) -> Vec<Srgba> {
    points.iter().map(|&[r, g, b]| Srgba::rgb(r, g, b)).collect()
}

/// Every built-in ramp, in dropdown order.
pub fn builtin_ramps() -> Vec<ColorRamp> {
    let sampled: [(&str, &[[f32; 3]; 8]); 5] = [
        ("viridis", &VIRIDIS),
        ("cividis", &CIVIDIS),
        ("plasma", &PLASMA),
        ("inferno", &INFERNO),
        ("magma", &MAGMA),
    ];
    let mut ramps = vec![
        ColorRamp::two_stop("green-red", GREEN, RED),
        ColorRamp::two_stop("blue-red", BLUE, RED),
    ];
    ramps.extend(sampled.into_iter().filter_map(|(name, points)| {
        match ColorRamp::evenly_spaced(name, false, &colors(points)) {
            Ok(ramp) => Some(ramp),
            Err(e) => {
                bevy::log::error!("Built-in gradient {} is invalid: {}", name, e);
                None
            }
        }
    }));
    ramps
}

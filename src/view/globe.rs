//! Rotating braille globe that draws traffic markers

use super::braille::{BrailleCanvas, Dot};
use crate::geo::{lat_lon_to_vector3, Vec3};
use crate::render_sync::{MarkerSink, MarkerStyle};
use chrono::{Timelike, Utc};
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Points behind the limb by less than this still draw, so outlines don't gap
const LIMB_SLACK: f32 = 0.05;
/// Marker disc radius in dots per unit of `MarkerStyle::size`
const MARKER_DOTS_PER_UNIT: f32 = 150.0;
const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 3.0;

// Coarse coastlines, (lat, lon) in degrees
const COASTLINES: &[&[(f32, f32)]] = &[
    // North America
    &[
        (70.0, -165.0), (71.0, -156.0), (70.0, -140.0), (69.0, -125.0), (72.0, -95.0),
        (68.0, -82.0), (60.0, -94.0), (55.0, -82.0), (62.0, -75.0), (60.0, -65.0),
        (52.0, -56.0), (45.0, -61.0), (42.0, -70.0), (35.0, -76.0), (30.0, -81.0),
        (25.0, -80.0), (30.0, -85.0), (29.0, -94.0), (22.0, -97.0), (18.0, -95.0),
        (21.0, -87.0), (16.0, -88.0), (9.0, -79.0), (8.0, -83.0), (15.0, -93.0),
        (20.0, -105.0), (31.0, -113.0), (34.0, -120.0), (40.0, -124.0), (48.0, -125.0),
        (55.0, -132.0), (60.0, -146.0), (58.0, -155.0), (55.0, -163.0), (60.0, -165.0),
        (66.0, -168.0),
    ],
    // South America
    &[
        (12.0, -72.0), (10.0, -62.0), (5.0, -52.0), (-1.0, -48.0), (-5.0, -35.0),
        (-13.0, -38.0), (-23.0, -42.0), (-34.0, -53.0), (-39.0, -62.0), (-47.0, -66.0),
        (-55.0, -68.0), (-52.0, -75.0), (-40.0, -73.0), (-30.0, -71.0), (-18.0, -70.0),
        (-14.0, -76.0), (-5.0, -81.0), (1.0, -80.0), (8.0, -77.0),
    ],
    // Eurasia
    &[
        (36.0, -9.0), (43.0, -9.0), (48.0, -4.0), (51.0, 2.0), (54.0, 9.0),
        (57.0, 8.0), (54.0, 13.0), (55.0, 20.0), (60.0, 29.0), (66.0, 23.0),
        (60.0, 18.0), (56.0, 13.0), (59.0, 6.0), (63.0, 8.0), (68.0, 14.0),
        (71.0, 25.0), (69.0, 35.0), (68.0, 45.0), (69.0, 60.0), (73.0, 70.0),
        (73.0, 80.0), (76.0, 100.0), (73.0, 113.0), (71.0, 130.0), (72.0, 150.0),
        (69.0, 161.0), (66.0, 179.0), (62.0, 178.0), (60.0, 165.0), (57.0, 162.0),
        (52.0, 157.0), (59.0, 155.0), (54.0, 142.0), (48.0, 140.0), (43.0, 132.0),
        (39.0, 128.0), (35.0, 126.0), (37.0, 122.0), (31.0, 122.0), (22.0, 114.0),
        (21.0, 108.0), (16.0, 108.0), (10.0, 106.0), (13.0, 100.0), (7.0, 100.0),
        (1.0, 104.0), (8.0, 98.0), (16.0, 97.0), (22.0, 91.0), (16.0, 82.0),
        (8.0, 77.0), (20.0, 73.0), (25.0, 67.0), (25.0, 57.0), (30.0, 49.0),
        (24.0, 51.0), (22.0, 60.0), (13.0, 45.0), (30.0, 32.0), (31.0, 34.0),
        (36.0, 36.0), (37.0, 28.0), (41.0, 29.0), (38.0, 24.0), (40.0, 20.0),
        (45.0, 13.0), (40.0, 18.0), (38.0, 16.0), (44.0, 9.0), (43.0, 3.0),
        (38.0, 0.0),
    ],
    // Africa
    &[
        (35.0, -6.0), (37.0, 10.0), (33.0, 11.0), (31.0, 20.0), (31.0, 30.0),
        (22.0, 37.0), (12.0, 43.0), (11.0, 51.0), (2.0, 45.0), (-5.0, 39.0),
        (-15.0, 41.0), (-25.0, 35.0), (-34.0, 26.0), (-34.0, 18.0), (-22.0, 14.0),
        (-12.0, 13.0), (-5.0, 12.0), (4.0, 9.0), (5.0, -3.0), (5.0, -8.0),
        (8.0, -13.0), (15.0, -17.0), (21.0, -17.0), (28.0, -13.0),
    ],
    // Australia
    &[
        (-11.0, 132.0), (-12.0, 137.0), (-17.0, 141.0), (-11.0, 142.0), (-19.0, 146.0),
        (-25.0, 153.0), (-32.0, 153.0), (-38.0, 150.0), (-39.0, 146.0), (-38.0, 140.0),
        (-35.0, 136.0), (-32.0, 134.0), (-34.0, 124.0), (-34.0, 115.0), (-26.0, 113.0),
        (-22.0, 114.0), (-20.0, 119.0), (-15.0, 125.0), (-14.0, 130.0),
    ],
    // Greenland
    &[
        (60.0, -43.0), (65.0, -40.0), (70.0, -22.0), (76.0, -19.0), (82.0, -30.0),
        (83.0, -40.0), (80.0, -65.0), (76.0, -70.0), (70.0, -54.0), (65.0, -52.0),
    ],
    // Great Britain
    &[
        (50.0, -5.0), (51.0, 1.0), (53.0, 0.0), (56.0, -2.0), (58.0, -3.0),
        (58.0, -5.0), (55.0, -6.0), (53.0, -3.0), (52.0, -5.0),
    ],
    // Japan
    &[
        (31.0, 130.0), (34.0, 135.0), (35.0, 140.0), (41.0, 141.0), (45.0, 142.0),
        (43.0, 145.0), (40.0, 140.0), (36.0, 136.0), (34.0, 132.0),
    ],
];

/// Shortest signed difference `to - from` in degrees, within -180..180
fn shortest_lon_delta(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Longitude (degrees) currently under the sun
pub fn solar_longitude() -> f32 {
    let now = Utc::now();
    let hours = now.hour() as f32 + now.minute() as f32 / 60.0 + now.second() as f32 / 3600.0;
    (12.0 - hours) * 15.0
}

/// Terminal rendering target for the marker pipeline
pub struct GlobeView {
    markers: HashMap<u64, (Vec3, MarkerStyle)>,
    next_handle: u64,
    spin: f32,
    tilt: f32,
    zoom: f32,
    default_tilt: f32,
}

impl MarkerSink for GlobeView {
    type Handle = u64;

    fn add_marker(&mut self, position: Vec3, style: MarkerStyle) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.markers.insert(handle, (position, style));
        handle
    }

    fn remove_marker(&mut self, handle: u64) {
        self.markers.remove(&handle);
    }
}

impl GlobeView {
    pub fn new(tilt_deg: f32) -> Self {
        let tilt = tilt_deg.to_radians().clamp(-FRAC_PI_2, FRAC_PI_2);
        Self {
            markers: HashMap::new(),
            next_handle: 0,
            spin: 0.0,
            tilt,
            zoom: 1.0,
            default_tilt: tilt,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Auto-rotation step
    pub fn advance(&mut self, radians: f32) {
        self.spin = (self.spin + radians).rem_euclid(TAU);
    }

    pub fn nudge_tilt(&mut self, radians: f32) {
        self.tilt = (self.tilt + radians).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset_view(&mut self) {
        self.tilt = self.default_tilt;
        self.zoom = 1.0;
    }

    /// Draw graticule, coastlines and markers. `solar_lon` in degrees.
    pub fn draw(&self, canvas: &mut BrailleCanvas, solar_lon: f32) {
        let w = canvas.dot_width() as f32;
        let h = canvas.dot_height() as f32;
        if w < 2.0 || h < 2.0 {
            return;
        }
        let projection = Projection {
            cx: w / 2.0,
            cy: h / 2.0,
            radius: w.min(h) / 2.0 * 0.92 * self.zoom,
            spin: self.spin,
            tilt: self.tilt,
        };
        let is_day = |lon: f32| shortest_lon_delta(solar_lon, lon).abs() < 90.0;

        // Limb
        let steps = (projection.radius * TAU).max(16.0) as i32;
        for i in 0..steps {
            let a = i as f32 / steps as f32 * TAU;
            let x = projection.cx + a.cos() * projection.radius;
            let y = projection.cy + a.sin() * projection.radius;
            canvas.plot(x as i32, y as i32, Dot::Shade(0));
        }

        // Graticule every 30 degrees
        for lat in (-60..=60).step_by(30) {
            for lon in -180..180 {
                let lon = lon as f32;
                let shade = if is_day(lon) { 1 } else { 0 };
                projection.plot_geo(canvas, lat as f32, lon, Dot::Shade(shade));
            }
        }
        for lon in (-180..180).step_by(30) {
            let lon = lon as f32;
            let shade = if is_day(lon) { 1 } else { 0 };
            for lat in -90..=90 {
                projection.plot_geo(canvas, lat as f32, lon, Dot::Shade(shade));
            }
        }

        for outline in COASTLINES {
            for (i, &(lat1, lon1)) in outline.iter().enumerate() {
                let (lat2, lon2) = outline[(i + 1) % outline.len()];
                let dlon = shortest_lon_delta(lon1, lon2);
                let steps = ((lat2 - lat1).abs().max(dlon.abs()) * 2.0).ceil().max(1.0) as i32;
                for t in 0..steps {
                    let frac = t as f32 / steps as f32;
                    let lat = lat1 + (lat2 - lat1) * frac;
                    let lon = lon1 + dlon * frac;
                    let shade = if is_day(lon) { 2 } else { 1 };
                    projection.plot_geo(canvas, lat, lon, Dot::Shade(shade));
                }
            }
        }

        for (position, style) in self.markers.values() {
            if let Some((x, y)) = projection.project(*position) {
                let r = (style.size * MARKER_DOTS_PER_UNIT).round().max(1.0) as i32;
                canvas.disc(x, y, r - 1, Dot::Ink(style.rgb));
            }
        }
    }
}

struct Projection {
    cx: f32,
    cy: f32,
    radius: f32,
    spin: f32,
    tilt: f32,
}

impl Projection {
    /// Screen dot for a unit-sphere point, or None when it faces away
    fn project(&self, p: Vec3) -> Option<(i32, i32)> {
        let v = p.rotate_y(self.spin).rotate_x(self.tilt);
        if v.z < -LIMB_SLACK {
            return None;
        }
        let x = self.cx + v.x * self.radius;
        let y = self.cy - v.y * self.radius;
        Some((x.round() as i32, y.round() as i32))
    }

    fn plot_geo(&self, canvas: &mut BrailleCanvas, lat: f32, lon: f32, dot: Dot) {
        if let Some((x, y)) = self.project(lat_lon_to_vector3(lat, lon, 1.0)) {
            canvas.plot(x, y, dot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::GLOBE_RADIUS;
    use std::f32::consts::PI;

    // Faces the viewer at spin 0, tilt 0
    const FACING_LON: f32 = -90.0;

    fn ink_dots(canvas: &BrailleCanvas) -> Vec<(i32, i32, (u8, u8, u8))> {
        let mut found = Vec::new();
        for y in 0..canvas.dot_height() as i32 {
            for x in 0..canvas.dot_width() as i32 {
                if let Dot::Ink(c) = canvas.get(x, y) {
                    found.push((x, y, c));
                }
            }
        }
        found
    }

    #[test]
    fn handles_add_and_remove() {
        let mut globe = GlobeView::new(0.0);
        let a = globe.add_marker(Vec3::default(), MarkerStyle::NORMAL);
        let b = globe.add_marker(Vec3::default(), MarkerStyle::SUSPICIOUS);
        assert_ne!(a, b);
        assert_eq!(globe.marker_count(), 2);
        globe.remove_marker(a);
        assert_eq!(globe.marker_count(), 1);
    }

    #[test]
    fn facing_marker_lands_at_center() {
        let mut globe = GlobeView::new(0.0);
        globe.add_marker(
            lat_lon_to_vector3(0.0, FACING_LON, GLOBE_RADIUS),
            MarkerStyle::NORMAL,
        );
        let mut canvas = BrailleCanvas::new(40, 20);
        globe.draw(&mut canvas, 0.0);

        let cx = canvas.dot_width() as i32 / 2;
        let cy = canvas.dot_height() as i32 / 2;
        assert_eq!(canvas.get(cx, cy), Dot::Ink(MarkerStyle::NORMAL.rgb));
    }

    #[test]
    fn far_side_marker_is_hidden() {
        let mut globe = GlobeView::new(0.0);
        globe.add_marker(
            lat_lon_to_vector3(0.0, FACING_LON + 180.0, GLOBE_RADIUS),
            MarkerStyle::SUSPICIOUS,
        );
        let mut canvas = BrailleCanvas::new(40, 20);
        globe.draw(&mut canvas, 0.0);
        assert!(ink_dots(&canvas).is_empty());

        // Half a turn brings it round
        globe.advance(PI);
        canvas.clear();
        globe.draw(&mut canvas, 0.0);
        assert!(!ink_dots(&canvas).is_empty());
    }

    #[test]
    fn suspicious_markers_draw_larger() {
        let mut normal = GlobeView::new(0.0);
        normal.add_marker(lat_lon_to_vector3(0.0, FACING_LON, 1.0), MarkerStyle::NORMAL);
        let mut suspicious = GlobeView::new(0.0);
        suspicious.add_marker(lat_lon_to_vector3(0.0, FACING_LON, 1.0), MarkerStyle::SUSPICIOUS);

        let mut a = BrailleCanvas::new(40, 20);
        let mut b = BrailleCanvas::new(40, 20);
        normal.draw(&mut a, 0.0);
        suspicious.draw(&mut b, 0.0);
        assert!(ink_dots(&b).len() > ink_dots(&a).len());
    }

    #[test]
    fn tilt_and_zoom_are_clamped() {
        let mut globe = GlobeView::new(10.0);
        globe.nudge_tilt(10.0);
        globe.zoom_by(100.0);
        assert!((globe.tilt - FRAC_PI_2).abs() < 1e-6);
        assert!((globe.zoom - MAX_ZOOM).abs() < 1e-6);
        globe.reset_view();
        assert!((globe.tilt - 10f32.to_radians()).abs() < 1e-6);
        assert!((globe.zoom - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lon_delta_wraps() {
        assert!((shortest_lon_delta(170.0, -170.0) - 20.0).abs() < 1e-4);
        assert!((shortest_lon_delta(-170.0, 170.0) + 20.0).abs() < 1e-4);
        assert!((shortest_lon_delta(0.0, 90.0) - 90.0).abs() < 1e-4);
    }
}

// src/math/geometry/sphere/mod.rs

// Deklaration der Untermodule für Kugel-spezifische Funktionalität
pub mod coordinates;
pub mod rotation;

pub use self::coordinates::{
    GeographicCoordinates, NORTH, geo_to_cart_surf_velo, glob_to_loc, lat_lon_of,
    lat_lon_of_orientation, loc_to_glob, sph_to_cart,
};
pub use self::rotation::Quaternion;

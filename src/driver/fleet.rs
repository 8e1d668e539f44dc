use crate::location::Coordinate;

use super::{Driver, Vehicle};

fn driver(
    id: u64,
    name: &str,
    rating: f64,
    (make, model, color, plate): (&str, &str, &str, &str),
    (lat, lng): (f64, f64),
) -> Driver {
    Driver {
        id,
        name: name.to_string(),
        rating,
        vehicle: Vehicle {
            make: make.to_string(),
            model: model.to_string(),
            color: color.to_string(),
            plate: plate.to_string(),
        },
        photo_url: format!("https://images.swiftride.example/drivers/{}.jpg", id),
        location: Coordinate::new(lat, lng),
    }
}

/// Drivers every fresh engine starts with.
pub fn default_fleet() -> Vec<Driver> {
    vec![
        driver(1, "Michael Chen", 4.9, ("Toyota", "Camry", "Silver", "ABC 1234"), (40.7580, -73.9855)),
        driver(2, "Sarah Johnson", 4.8, ("Honda", "Accord", "Black", "XYZ 5678"), (40.7484, -73.9857)),
        driver(3, "David Rodriguez", 4.7, ("Tesla", "Model 3", "White", "EVR 2024"), (40.7061, -74.0087)),
        driver(4, "Emily Davis", 4.95, ("BMW", "5 Series", "Blue", "LUX 8899"), (40.7794, -73.9632)),
        driver(5, "James Wilson", 4.6, ("Toyota", "Prius", "Green", "ECO 4321"), (40.7306, -73.9352)),
    ]
}

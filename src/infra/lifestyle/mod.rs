// Third-party content clients behind the lifestyle commands.

pub mod openweather_client;
pub mod wikipedia_client;

pub use openweather_client::OpenWeatherClient;
pub use wikipedia_client::WikipediaClient;

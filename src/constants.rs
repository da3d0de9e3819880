pub mod prediction {

    pub const STUB_PREDICTION_KEY: &str = "prediction";

    pub const STUB_PREDICTION_VALUE: &str = "sample_result";
}

pub mod events {

    pub const DEFAULT_BUS_CAPACITY: usize = 100;
}

pub mod config {

    pub const APP_DIR: &str = "modelhub";

    pub const FILE_NAME: &str = "config.toml";
}

/// Upstream feed endpoints. Overridable from the CLI so runs can be pointed
/// at a mirror or a test fixture server.
pub const CPC_DAILY_URL: &str =
    "https://www.cpc.ncep.noaa.gov/products/analysis_monitoring/cdus/prcp_temp_tables/dly_glob1.txt";
pub const CDO_QUERY_URL: &str = "https://www7.ncdc.noaa.gov/CDO/cdodata.cmd";

/// CPC daily global report layout: the report date sits on this 0-based
/// line, data rows follow immediately after.
pub const CPC_DATE_LINE: usize = 21;

/// Feed-specific "no reading" sentinels. Rows carrying either one are
/// dropped before storage.
pub const CPC_MISSING_SENTINEL: i32 = -999;
pub const GSOD_MISSING_SENTINEL: i32 = 10000;

/// Station source tags as stored in the station table.
pub const SOURCE_CPC: &str = "CPC";
pub const SOURCE_GSOD: &str = "GSOD";

/// GDD response curve, degrees Fahrenheit: growth threshold and daily
/// saturation ceiling.
pub const GDD_BASE_TEMP: f32 = 50.0;
pub const GDD_DAILY_CAP: f32 = 36.0;

/// Interpolation parameters: inverse-distance power, nearest-neighbor count,
/// and the maximum search radius in map units (meters).
pub const IDW_POWER: f64 = 2.0;
pub const IDW_NEIGHBOR_COUNT: usize = 10;
pub const IDW_MAX_RADIUS: f64 = 300_000.0;

/// Output grid: Web Mercator extent covering the continental monitoring
/// area, 5 km cells.
pub const GRID_XMIN: f64 = -20_000_000.0;
pub const GRID_YMIN: f64 = 1_800_000.0;
pub const GRID_XMAX: f64 = -7_000_000.0;
pub const GRID_YMAX: f64 = 11_600_000.0;
pub const GRID_CELL_SIZE: f64 = 5_000.0;

/// Default locations for the temperature store and the raster catalog.
pub const DEFAULT_DATABASE: &str = "temperature.db";
pub const DEFAULT_CATALOG_DIR: &str = "gdd_catalog";

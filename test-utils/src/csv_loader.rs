use std::error::Error;

use csv::Reader;

use common::constants::N_CHANNELS;
use common::SensorKind;

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
pub enum CsvFileColumn {
    Timestamp,
    XGyro,
    YGyro,
    ZGyro,
    XAccel,
    YAccel,
    ZAccel,
}

impl From<CsvFileColumn> for usize {
    fn from(value: CsvFileColumn) -> Self {
        value as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct CsvColumnMapper {
    columns: Vec<usize>,
}

impl CsvColumnMapper {
    pub fn new() -> Self {
        Self { columns: vec![] }
    }

    pub fn columns(&self) -> Vec<usize> {
        self.columns.clone()
    }

    pub fn add_timestamp(&mut self) -> &mut Self {
        self.columns.push(CsvFileColumn::Timestamp.into());
        self
    }

    pub fn add_gyro(&mut self) -> &mut Self {
        self.columns.push(CsvFileColumn::XGyro.into());
        self.columns.push(CsvFileColumn::YGyro.into());
        self.columns.push(CsvFileColumn::ZGyro.into());
        self
    }

    pub fn add_accel(&mut self) -> &mut Self {
        self.columns.push(CsvFileColumn::XAccel.into());
        self.columns.push(CsvFileColumn::YAccel.into());
        self.columns.push(CsvFileColumn::ZAccel.into());
        self
    }

    pub fn add_sensor(&mut self, sensor_kind: SensorKind) -> &mut Self {
        match sensor_kind {
            SensorKind::Accelerometer => self.add_accel(),
            SensorKind::Gyroscope => self.add_gyro(),
        }
    }
}

pub fn load_csv(file_path: &str) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let mut rdr = Reader::from_path(file_path)?;
    let mut data = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let row: Vec<f64> = record
            .iter()
            .filter_map(|s| s.parse::<f64>().ok())
            .collect();
        data.push(row);
    }

    Ok(data)
}

pub fn load_csv_columns(
    file_path: &str,
    columns: &[usize],
) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    if columns.is_empty() {
        return Err("No columns provided".into());
    }

    load_csv(file_path)?
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|&i| {
                    row.get(i)
                        .copied()
                        .ok_or_else(|| format!("Column index {} out of bounds", i).into())
                })
                .collect()
        })
        .collect()
}

/// Loads the raw channel values of one sensor, one entry per recorded event.
pub fn load_sensor_readings(
    file_path: &str,
    sensor_kind: SensorKind,
) -> Result<Vec<[f32; N_CHANNELS]>, Box<dyn Error>> {
    let mut mapper = CsvColumnMapper::new();
    mapper.add_sensor(sensor_kind);

    load_csv_columns(file_path, &mapper.columns())?
        .into_iter()
        .map(|row| match row.as_slice() {
            [x, y, z] => Ok([*x as f32, *y as f32, *z as f32]),
            _ => Err("Failed to convert row to readings".into()),
        })
        .collect()
}

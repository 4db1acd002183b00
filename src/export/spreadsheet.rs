use crate::error::Result;
use crate::models::{ApiEndpoint, DiscoveryResult, EndpointSet};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatUnderline, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SHEET_NAME: &str = "API Endpoints";

const HEADERS: [&str; 5] = ["Method", "Path", "Full Endpoint", "Description", "Parameters"];
const COLUMN_WIDTHS: [f64; 5] = [12.0, 40.0, 50.0, 60.0, 40.0];
const LAST_COLUMN: u16 = HEADERS.len() as u16 - 1;

const METADATA_FIRST_ROW: u32 = 1;
pub const HEADER_ROW: u32 = 8;

/// `Stripe Inc` at 2024-05-01 09:30:00 → `Stripe_Inc_API_Endpoints_20240501_093000.xlsx`.
pub fn default_filename(company_name: &str, now: DateTime<Local>) -> String {
    let name = company_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_API_Endpoints_{}.xlsx", name, now.format("%Y%m%d_%H%M%S"))
}

/// Stand-in row for a documentation page that yielded no endpoints.
pub fn placeholder_endpoint(doc_url: &str) -> ApiEndpoint {
    ApiEndpoint::new(
        "N/A",
        "N/A",
        format!("Automatic extraction failed. Please visit {doc_url} to view endpoints."),
    )
}

/// Renders a discovery result as a single-sheet xlsx workbook.
pub struct SpreadsheetExporter {
    generated_at: DateTime<Local>,
}

impl Default for SpreadsheetExporter {
    fn default() -> Self {
        Self::new(Local::now())
    }
}

impl SpreadsheetExporter {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self { generated_at }
    }

    pub fn output_path(&self, company_name: &str, requested: Option<PathBuf>) -> PathBuf {
        requested.unwrap_or_else(|| PathBuf::from(default_filename(company_name, self.generated_at)))
    }

    pub fn write(&self, result: &DiscoveryResult, path: &Path) -> Result<PathBuf> {
        info!(company = %result.company_name, path = %path.display(), "Creating spreadsheet");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        self.write_title(sheet, &result.company_name)?;
        self.write_metadata(sheet, result)?;
        let last_row = self.write_table(sheet, &result.endpoints)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }
        sheet.set_freeze_panes(HEADER_ROW + 1, 0)?;
        sheet.autofilter(HEADER_ROW, 0, last_row, LAST_COLUMN)?;

        workbook.save(path)?;
        info!(path = %path.display(), "Spreadsheet saved");

        Ok(path.to_path_buf())
    }

    fn write_title(&self, sheet: &mut Worksheet, company_name: &str) -> Result<()> {
        let format = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        sheet.merge_range(
            0,
            0,
            0,
            LAST_COLUMN,
            &format!("{company_name} API Endpoints"),
            &format,
        )?;
        Ok(())
    }

    fn write_metadata(&self, sheet: &mut Worksheet, result: &DiscoveryResult) -> Result<()> {
        let label = Format::new().set_bold();
        let link = Format::new()
            .set_font_color(Color::RGB(0x0000FF))
            .set_underline(FormatUnderline::Single);

        let or_na = |value: &str| {
            if value.trim().is_empty() {
                "N/A".to_string()
            } else {
                value.to_string()
            }
        };

        let rows = [
            ("Documentation URL:", or_na(result.documentation_url.as_deref().unwrap_or_default())),
            ("Has API:", if result.has_api { "Yes" } else { "No" }.to_string()),
            ("API Type:", or_na(&result.api_type)),
            ("Base URL:", or_na(&result.base_url)),
            ("Generated:", self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ];

        let mut row = METADATA_FIRST_ROW;
        for (name, value) in rows {
            sheet.write_string_with_format(row, 0, name, &label)?;
            if value.starts_with("http") {
                sheet.write_string_with_format(row, 1, &value, &link)?;
            } else {
                sheet.write_string(row, 1, &value)?;
            }
            row += 1;
        }

        sheet.write_string_with_format(row, 0, "Total Endpoints:", &label)?;
        sheet.write_number(row, 1, result.endpoints.len() as f64)?;
        Ok(())
    }

    /// Writes the header and one row per endpoint sorted by (path, method). Returns the last row used.
    fn write_table(&self, sheet: &mut Worksheet, endpoints: &EndpointSet) -> Result<u32> {
        let header = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x366092))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let shaded = Format::new().set_background_color(Color::RGB(0xF2F2F2));
        let plain = Format::new();

        for (col, title) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col as u16, *title, &header)?;
        }

        let mut sorted: Vec<&ApiEndpoint> = endpoints.iter().collect();
        sorted.sort_by(|a, b| (&a.path, &a.method).cmp(&(&b.path, &b.method)));

        let mut row = HEADER_ROW;
        for endpoint in sorted {
            row += 1;
            let format = if row % 2 == 0 { &shaded } else { &plain };
            let cells = [
                endpoint.method.clone(),
                endpoint.path.clone(),
                endpoint.full_endpoint(),
                endpoint.description.clone(),
                endpoint.parameter_summary(),
            ];
            for (col, value) in cells.iter().enumerate() {
                sheet.write_string_with_format(row, col as u16, value, format)?;
            }
        }

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiParameter;
    use calamine::{Data, Range, Reader, Xlsx, open_workbook};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn read_sheet(path: &Path) -> Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn cell(range: &Range<Data>, row: u32, col: u32) -> String {
        range
            .get((row as usize, col as usize))
            .map(|data| data.to_string())
            .unwrap_or_default()
    }

    fn sample_result() -> DiscoveryResult {
        let endpoints = vec![
            ApiEndpoint::new("POST", "/users", "Create a user").with_parameters(vec![ApiParameter {
                name: "email".to_string(),
                param_type: "string".to_string(),
                required: true,
            }]),
            ApiEndpoint::new("GET", "/users", "List users"),
            ApiEndpoint::new("DELETE", "/accounts/{id}", "Close an account, permanently"),
        ];

        DiscoveryResult {
            company_name: "Acme".to_string(),
            has_api: true,
            api_type: "REST".to_string(),
            base_url: "https://api.acme.test/v1".to_string(),
            endpoints: endpoints.into_iter().collect(),
            ..DiscoveryResult::default()
        }
    }

    #[test]
    fn writes_one_row_per_endpoint_sorted_by_path_then_method() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.xlsx");

        SpreadsheetExporter::new(fixed_time())
            .write(&sample_result(), &path)
            .unwrap();
        let range = read_sheet(&path);

        assert_eq!(range.height() as u32, HEADER_ROW + 1 + 3);
        assert_eq!(cell(&range, 0, 0), "Acme API Endpoints");
        assert_eq!(cell(&range, HEADER_ROW, 0), "Method");
        assert_eq!(cell(&range, HEADER_ROW, 4), "Parameters");

        let rows: Vec<(String, String, String)> = (HEADER_ROW + 1..HEADER_ROW + 4)
            .map(|row| (cell(&range, row, 0), cell(&range, row, 1), cell(&range, row, 3)))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("DELETE".into(), "/accounts/{id}".into(), "Close an account, permanently".into()),
                ("GET".into(), "/users".into(), "List users".into()),
                ("POST".into(), "/users".into(), "Create a user".into()),
            ]
        );
        assert_eq!(cell(&range, HEADER_ROW + 3, 2), "POST /users");
        assert_eq!(cell(&range, HEADER_ROW + 3, 4), "email* (string)");
    }

    #[test]
    fn metadata_block_reflects_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.xlsx");

        SpreadsheetExporter::new(fixed_time())
            .write(&sample_result(), &path)
            .unwrap();
        let range = read_sheet(&path);

        assert_eq!(cell(&range, 1, 0), "Documentation URL:");
        assert_eq!(cell(&range, 1, 1), "N/A");
        assert_eq!(cell(&range, 2, 1), "Yes");
        assert_eq!(cell(&range, 3, 1), "REST");
        assert_eq!(cell(&range, 4, 1), "https://api.acme.test/v1");
        assert_eq!(cell(&range, 5, 1), "2024-05-01 09:30:00");
        assert_eq!(cell(&range, 6, 0), "Total Endpoints:");
        assert_eq!(range.get((6, 1)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn duplicate_input_collapses_to_distinct_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupes.xlsx");
        let endpoints = vec![
            ApiEndpoint::new("GET", "/users", ""),
            ApiEndpoint::new("POST", "/users", ""),
            ApiEndpoint::new("GET", "/users", ""),
        ];
        let result = DiscoveryResult::from_scrape("Acme", "https://acme.com/docs", endpoints);

        SpreadsheetExporter::new(fixed_time()).write(&result, &path).unwrap();
        let range = read_sheet(&path);

        assert_eq!(range.height() as u32, HEADER_ROW + 1 + 2);
        assert_eq!(cell(&range, HEADER_ROW + 1, 2), "GET /users");
        assert_eq!(cell(&range, HEADER_ROW + 2, 2), "POST /users");
        assert_eq!(cell(&range, 1, 1), "https://acme.com/docs");
    }

    #[test]
    fn empty_result_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("empty.xlsx");
        let result = DiscoveryResult {
            company_name: "Quiet".to_string(),
            ..DiscoveryResult::default()
        };

        let written = SpreadsheetExporter::new(fixed_time()).write(&result, &path).unwrap();
        let range = read_sheet(&written);

        assert_eq!(range.height() as u32, HEADER_ROW + 1);
        assert_eq!(cell(&range, 2, 1), "No");
        assert_eq!(cell(&range, 3, 1), "N/A");
    }

    #[test]
    fn placeholder_row_points_at_documentation() {
        let endpoint = placeholder_endpoint("https://acme.com/docs");
        assert_eq!(endpoint.full_endpoint(), "N/A N/A");
        assert!(endpoint.description.contains("https://acme.com/docs"));
    }

    #[test]
    fn default_filename_uses_company_and_timestamp() {
        assert_eq!(
            default_filename("Stripe Inc", fixed_time()),
            "Stripe_Inc_API_Endpoints_20240501_093000.xlsx"
        );
    }

    #[test]
    fn explicit_output_path_wins() {
        let exporter = SpreadsheetExporter::new(fixed_time());
        assert_eq!(
            exporter.output_path("Acme", Some(PathBuf::from("out/acme.xlsx"))),
            PathBuf::from("out/acme.xlsx")
        );
        assert_eq!(
            exporter.output_path("Acme", None),
            PathBuf::from("Acme_API_Endpoints_20240501_093000.xlsx")
        );
    }
}

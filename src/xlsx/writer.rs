use crate::error::Result;
use crate::model::{AggregateTable, PlayerAggregate, PlayerTotals};
use rust_xlsxwriter::{Chart, ChartType, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const TOP_SHEET: &str = "Top Players";

// Column layout shared by both sheets
const COL_PLAYER: u16 = 0;
const COL_GAMES: u16 = 1;
const COL_GAIN: u16 = 2;
const COL_WINS: u16 = 3;
const COL_WIN_PCT: u16 = 4;

/// Write an aggregate table to an Excel workbook.
///
/// The "Players" sheet lists every player by monetary gain. The "Top Players"
/// sheet holds the `top_n` biggest winners with a line chart of their
/// statistics and scatter charts of wins against gain and games against wins.
pub fn write_report(table: &AggregateTable, path: &Path, top_n: usize) -> Result<()> {
    let mut workbook = build_report(table, top_n)?;
    workbook.save(path)?;
    Ok(())
}

fn build_report(table: &AggregateTable, top_n: usize) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let ranked = table.nlargest_by_gain(table.len());
    let players_sheet = workbook.add_worksheet();
    players_sheet.set_name("Players")?;
    write_players_sheet(players_sheet, &ranked, Some(table.totals()?))?;

    let top = &ranked[..top_n.min(ranked.len())];
    let top_sheet = workbook.add_worksheet();
    top_sheet.set_name(TOP_SHEET)?;
    write_players_sheet(top_sheet, top, None)?;
    if !top.is_empty() {
        add_charts(top_sheet, top.len() as u32)?;
    }

    Ok(workbook)
}

/// Write player rows, with an optional totals line at the bottom
fn write_players_sheet(
    sheet: &mut Worksheet,
    rows: &[PlayerAggregate],
    totals: Option<PlayerTotals>,
) -> Result<()> {
    sheet.set_column_width(COL_PLAYER, 20)?;
    sheet.set_column_width(COL_GAMES, 10)?;
    sheet.set_column_width(COL_GAIN, 14)?;
    sheet.set_column_width(COL_WINS, 10)?;
    sheet.set_column_width(COL_WIN_PCT, 10)?;

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin);
    let left_format = Format::new().set_align(FormatAlign::Left);
    let count_format = Format::new().set_align(FormatAlign::Right).set_num_format("#,##0");
    let pct_format = Format::new().set_align(FormatAlign::Right).set_num_format("0.00");
    let total_format = Format::new().set_bold().set_border_top(FormatBorder::Thin);

    let headers = ["Player", "Games", "Monetary Gain", "Wins", "Win %"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        sheet.write_string_with_format(r, COL_PLAYER, &row.player_name, &left_format)?;
        write_totals(sheet, r, row.totals(), &count_format, &pct_format)?;
    }

    if let Some(totals) = totals {
        let r = (rows.len() + 1) as u32;
        sheet.write_string_with_format(r, COL_PLAYER, "Total", &total_format)?;
        write_totals(sheet, r, totals, &count_format, &pct_format)?;
    }

    Ok(())
}

fn write_totals(
    sheet: &mut Worksheet,
    row: u32,
    totals: PlayerTotals,
    count_format: &Format,
    pct_format: &Format,
) -> Result<()> {
    sheet.write_number_with_format(row, COL_GAMES, totals.game_count as f64, count_format)?;
    sheet.write_number_with_format(row, COL_GAIN, totals.monetary_gain as f64, count_format)?;
    sheet.write_number_with_format(row, COL_WINS, totals.num_wins as f64, count_format)?;
    sheet.write_number_with_format(row, COL_WIN_PCT, totals.win_rate(), pct_format)?;
    Ok(())
}

/// Charts over the first `n` data rows of the top-players sheet
fn add_charts(sheet: &mut Worksheet, n: u32) -> Result<()> {
    let mut by_player = Chart::new(ChartType::Line);
    for (col, name) in [(COL_GAMES, "Games"), (COL_GAIN, "Monetary gain"), (COL_WINS, "Wins")] {
        by_player
            .add_series()
            .set_name(name)
            .set_categories((TOP_SHEET, 1, COL_PLAYER, n, COL_PLAYER))
            .set_values((TOP_SHEET, 1, col, n, col));
    }
    by_player.title().set_name("Top players");
    by_player.x_axis().set_name("Player");
    sheet.insert_chart(1, COL_WIN_PCT + 2, &by_player)?;

    let mut gain_by_wins = Chart::new(ChartType::Scatter);
    gain_by_wins
        .add_series()
        .set_name("Players")
        .set_categories((TOP_SHEET, 1, COL_WINS, n, COL_WINS))
        .set_values((TOP_SHEET, 1, COL_GAIN, n, COL_GAIN));
    gain_by_wins.title().set_name("Monetary gain by wins");
    gain_by_wins.x_axis().set_name("Wins");
    gain_by_wins.y_axis().set_name("Monetary gain");
    gain_by_wins.legend().set_hidden();
    sheet.insert_chart(17, COL_WIN_PCT + 2, &gain_by_wins)?;

    let wins_by_games = {
        let mut chart = Chart::new(ChartType::Scatter);
        chart
            .add_series()
            .set_name("Players")
            .set_categories((TOP_SHEET, 1, COL_GAMES, n, COL_GAMES))
            .set_values((TOP_SHEET, 1, COL_WINS, n, COL_WINS));
        chart.title().set_name("Wins by games played");
        chart.x_axis().set_name("Games");
        chart.y_axis().set_name("Wins");
        chart.legend().set_hidden();
        chart
    };
    sheet.insert_chart(33, COL_WIN_PCT + 2, &wins_by_games)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> AggregateTable {
        let mut table = AggregateTable::new();
        table.add("deadhead", PlayerTotals::new(4, 125, 2)).unwrap();
        table.add("justnuts", PlayerTotals::new(4, 0, 0)).unwrap();
        table.add("rimedio", PlayerTotals::new(6, -180, 1)).unwrap();
        table
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&sample_table(), &path, 2).unwrap();

        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0);
    }

    #[test]
    fn test_write_empty_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_report(&AggregateTable::new(), &path, 40).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_top_players_sheet_has_three_charts() {
        let mut workbook = build_report(&sample_table(), 2).unwrap();
        assert!(workbook.worksheet_from_name("Players").is_ok());
        assert!(workbook.worksheet_from_name("Top Players").is_ok());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts.xlsx");
        workbook.save(&path).unwrap();

        // zip entry names are stored uncompressed
        let bytes = std::fs::read(&path).unwrap();
        let has_entry = |name: &str| bytes.windows(name.len()).any(|w| w == name.as_bytes());
        assert!(has_entry("xl/charts/chart1.xml"));
        assert!(has_entry("xl/charts/chart3.xml"));
        assert!(!has_entry("xl/charts/chart4.xml"));
    }

    #[test]
    fn test_overflowing_totals_are_reported() {
        let mut table = AggregateTable::new();
        table.add("deadhead", PlayerTotals::new(1, i64::MAX, 1)).unwrap();
        table.add("justnuts", PlayerTotals::new(1, 1, 1)).unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overflow.xlsx");
        assert!(matches!(
            write_report(&table, &path, 2),
            Err(crate::error::StatsError::Overflow(_))
        ));
    }
}

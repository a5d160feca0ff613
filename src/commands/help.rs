/// Command reference shown by `help`
pub fn execute() -> Result<String, String> {
    let mut out = String::from("📖 volscope commands\n\n");

    out.push_str("🎛️ Inputs\n");
    out.push_str("  source <yahoo|coingecko>   Select the data source\n");
    out.push_str("  symbol <text>              Symbol (Yahoo, e.g. BTC-USD) or coin id (CoinGecko, e.g. bitcoin)\n");
    out.push_str("  start <YYYY-MM-DD>         Start date (Yahoo)\n");
    out.push_str("  end <YYYY-MM-DD>           End date, exclusive (Yahoo)\n");
    out.push_str("  days <30-365>              Number of days (CoinGecko)\n");
    out.push_str("  log [on|off]               Use log scale for price\n\n");

    out.push_str("▶️ Actions\n");
    out.push_str("  fetch                      Fetch data, chart price & volatility, forecast\n");
    out.push_str("  show                       Show the current inputs\n");
    out.push_str("  help                       Show this help message\n");
    out.push_str("  quit                       Leave the session\n");

    Ok(out)
}

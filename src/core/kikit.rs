use crate::domain::model::CommandSpec;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static UNSAFE_VENDOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("vendor pattern is valid"));

/// Lowercases the vendor and collapses anything that is not `[A-Za-z0-9_.-]` into `-`,
/// so it can be used as a folder name.
pub fn sanitize_vendor(vendor: &str) -> String {
    UNSAFE_VENDOR_CHARS
        .replace_all(&vendor.trim().to_lowercase(), "-")
        .into_owned()
}

/// The BOM field KiKit uses to match parts with the vendor's catalogue.
pub fn order_field(vendor: &str) -> &'static str {
    if vendor.eq_ignore_ascii_case("jlcpcb") {
        "LCSC"
    } else {
        "MPN"
    }
}

pub fn vendor_dir(production_dir: &Path, vendor: &str) -> PathBuf {
    production_dir.join(format!("{}_production", sanitize_vendor(vendor)))
}

pub fn fab_command(
    python: &Path,
    vendor: &str,
    schematic: &Path,
    board: &Path,
    out_dir: &Path,
) -> CommandSpec {
    CommandSpec::new(python)
        .args(["-m", "kikit.ui", "fab", vendor, "--assembly", "--schematic"])
        .arg(schematic)
        .args(["--field", order_field(vendor)])
        .arg(board)
        .arg(out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_vendor() {
        assert_eq!(sanitize_vendor("JLCPCB"), "jlcpcb");
        assert_eq!(sanitize_vendor("  PCB Way!! "), "pcb-way-");
        assert_eq!(sanitize_vendor("../oshpark"), "..-oshpark");
    }

    #[test]
    fn test_order_field() {
        assert_eq!(order_field("jlcpcb"), "LCSC");
        assert_eq!(order_field("JLCPCB"), "LCSC");
        assert_eq!(order_field("pcbway"), "MPN");
    }

    #[test]
    fn test_fab_command_shape() {
        let spec = fab_command(
            Path::new("python"),
            "jlcpcb",
            Path::new("b.kicad_sch"),
            Path::new("b.kicad_pcb"),
            Path::new("PRODUCTION/b/jlcpcb_production"),
        );
        let args: Vec<String> = spec
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m",
                "kikit.ui",
                "fab",
                "jlcpcb",
                "--assembly",
                "--schematic",
                "b.kicad_sch",
                "--field",
                "LCSC",
                "b.kicad_pcb",
                "PRODUCTION/b/jlcpcb_production",
            ]
        );
    }
}

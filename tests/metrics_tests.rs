// df-output parsing tests

use statuscast::metrics::parse_df_output;

const DF_OUTPUT: &str = "\
Filesystem     1M-blocks  Used Available Use% Mounted on
/dev/sda1          98304 41287     52041  45% /
/dev/sdb1         491520 98304    368640  21% /data
";

#[test]
fn test_parse_standard_df_output() {
    let drives = parse_df_output(DF_OUTPUT);
    assert_eq!(drives.len(), 2);
    assert_eq!(drives[0].percent, "45%");
    assert_eq!(drives[0].mount, "/");
    assert_eq!(drives[1].percent, "21%");
    assert_eq!(drives[1].mount, "/data");
}

#[test]
fn test_parse_tolerates_collapsed_whitespace() {
    let drives = parse_df_output("/dev/sda1   42%   /data");
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].percent, "42%");
    assert_eq!(drives[0].mount, "/data");
}

#[test]
fn test_parse_drops_malformed_rows() {
    let text = "\
Filesystem     1M-blocks  Used Available Use% Mounted on
/dev/sda1          98304 41287     52041  45% /
garbage
/dev/sdc1 17%
";
    // The percent-without-mount row and the fieldless row both fall out.
    let drives = parse_df_output(text);
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].mount, "/");
}

#[test]
fn test_parse_skips_header_row() {
    let drives = parse_df_output("Filesystem 1M-blocks Used Available Use% Mounted on");
    assert!(drives.is_empty());
}

#[test]
fn test_parse_excludes_virtual_filesystems() {
    let text = "\
Filesystem     1M-blocks  Used Available Use% Mounted on
tmpfs               8192     1      8191   1% /run
/dev/sda1          98304 41287     52041  45% /
overlay            98304 41287     52041  45% /var/lib/docker/overlay2/x
";
    let drives = parse_df_output(text);
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].mount, "/");
}

#[test]
fn test_parse_tolerates_extra_trailing_fields() {
    let drives = parse_df_output("/dev/sda1 98304 41287 52041 45% /data extra trailing");
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].percent, "45%");
    assert_eq!(drives[0].mount, "/data");
}

#[test]
fn test_parse_empty_input() {
    assert!(parse_df_output("").is_empty());
}

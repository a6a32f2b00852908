//! Locale font tables: where common families live on Windows, macOS and
//! Linux, and where TeX installs Computer Modern.
//!
//! Table entries are paths relative to a font root (`EngineConfig`'s
//! `system_font_roots`), so one table serves every platform: `times.ttf`
//! resolves under `C:\Windows\Fonts`, `dejavu/DejaVuSerif.ttf` under
//! `/usr/share/fonts/truetype`.

use std::path::{Path, PathBuf};

use pdfreplace_core::{FamilyBucket, classify_family};

/// Files for one family, indexed by [`style_index`].
struct FamilyFiles {
    needles: &'static [&'static str],
    files: [&'static [&'static str]; 4],
}

/// 0 regular, 1 bold, 2 italic, 3 bold italic.
fn style_index(bold: bool, italic: bool) -> usize {
    usize::from(bold) + 2 * usize::from(italic)
}

const NAMED_FAMILIES: &[FamilyFiles] = &[
    FamilyFiles {
        needles: &["calibri"],
        files: [
            &["calibri.ttf", "Calibri.ttf"],
            &["calibrib.ttf", "Calibri Bold.ttf"],
            &["calibrii.ttf", "Calibri Italic.ttf"],
            &["calibriz.ttf", "Calibri Bold Italic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["cambria"],
        files: [
            &["cambria.ttc", "cambria.ttf", "Cambria.ttf"],
            &["cambriab.ttf", "Cambria Bold.ttf"],
            &["cambriai.ttf", "Cambria Italic.ttf"],
            &["cambriaz.ttf", "Cambria Bold Italic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["georgia"],
        files: [
            &["georgia.ttf", "Georgia.ttf"],
            &["georgiab.ttf", "Georgia Bold.ttf"],
            &["georgiai.ttf", "Georgia Italic.ttf"],
            &["georgiaz.ttf", "Georgia Bold Italic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["garamond"],
        files: [
            &["gara.ttf", "garamond.ttf"],
            &["garabd.ttf", "garamondb.ttf"],
            &["garait.ttf", "garamondi.ttf"],
            &["garabi.ttf", "garamondz.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["palatino", "bookantiqua"],
        files: [
            &["pala.ttf", "Palatino Linotype.ttf"],
            &["palab.ttf"],
            &["palai.ttf"],
            &["palabi.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["constantia"],
        files: [
            &["constan.ttf"],
            &["constanb.ttf"],
            &["constani.ttf"],
            &["constanz.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["bookman", "bookos"],
        files: [
            &["bookos.ttf", "BOOKOS.TTF"],
            &["bookosb.ttf", "BOOKOSB.TTF"],
            &["bookosi.ttf", "BOOKOSI.TTF"],
            &["bookosbi.ttf", "BOOKOSBI.TTF"],
        ],
    },
    FamilyFiles {
        needles: &["goudy", "goudos"],
        files: [
            &["goudos.ttf", "GOUDOS.TTF"],
            &["goudosb.ttf", "GOUDOSB.TTF"],
            &["goudosi.ttf", "GOUDOSI.TTF"],
            &["goudosbi.ttf", "GOUDOSBI.TTF"],
        ],
    },
    FamilyFiles {
        needles: &["centaur"],
        files: [&["centaur.ttf"], &["centaur.ttf"], &["centaur.ttf"], &["centaur.ttf"]],
    },
    FamilyFiles {
        needles: &["century"],
        files: [&["century.ttf"], &["century.ttf"], &["century.ttf"], &["century.ttf"]],
    },
    FamilyFiles {
        needles: &["dejavusansmono", "dejavu-sans-mono"],
        files: [
            &["dejavu/DejaVuSansMono.ttf"],
            &["dejavu/DejaVuSansMono-Bold.ttf"],
            &["dejavu/DejaVuSansMono-Oblique.ttf"],
            &["dejavu/DejaVuSansMono-BoldOblique.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["dejavuserif", "dejavu-serif"],
        files: [
            &["dejavu/DejaVuSerif.ttf"],
            &["dejavu/DejaVuSerif-Bold.ttf"],
            &["dejavu/DejaVuSerif-Italic.ttf"],
            &["dejavu/DejaVuSerif-BoldItalic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["dejavusans", "dejavu-sans"],
        files: [
            &["dejavu/DejaVuSans.ttf"],
            &["dejavu/DejaVuSans-Bold.ttf"],
            &["dejavu/DejaVuSans-Oblique.ttf"],
            &["dejavu/DejaVuSans-BoldOblique.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["liberationserif", "liberation-serif"],
        files: [
            &["liberation2/LiberationSerif-Regular.ttf", "liberation/LiberationSerif-Regular.ttf"],
            &["liberation2/LiberationSerif-Bold.ttf", "liberation/LiberationSerif-Bold.ttf"],
            &["liberation2/LiberationSerif-Italic.ttf", "liberation/LiberationSerif-Italic.ttf"],
            &[
                "liberation2/LiberationSerif-BoldItalic.ttf",
                "liberation/LiberationSerif-BoldItalic.ttf",
            ],
        ],
    },
    FamilyFiles {
        needles: &["liberationsans", "liberation-sans"],
        files: [
            &["liberation2/LiberationSans-Regular.ttf", "liberation/LiberationSans-Regular.ttf"],
            &["liberation2/LiberationSans-Bold.ttf", "liberation/LiberationSans-Bold.ttf"],
            &["liberation2/LiberationSans-Italic.ttf", "liberation/LiberationSans-Italic.ttf"],
            &[
                "liberation2/LiberationSans-BoldItalic.ttf",
                "liberation/LiberationSans-BoldItalic.ttf",
            ],
        ],
    },
    FamilyFiles {
        needles: &["times", "newroman"],
        files: [
            &["times.ttf", "Times New Roman.ttf"],
            &["timesbd.ttf", "Times New Roman Bold.ttf"],
            &["timesi.ttf", "Times New Roman Italic.ttf"],
            &["timesbi.ttf", "Times New Roman Bold Italic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["arial", "helvetica"],
        files: [
            &["arial.ttf", "Arial.ttf"],
            &["arialbd.ttf", "Arial Bold.ttf"],
            &["ariali.ttf", "Arial Italic.ttf"],
            &["arialbi.ttf", "Arial Bold Italic.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["consolas"],
        files: [
            &["consola.ttf"],
            &["consolab.ttf"],
            &["consolai.ttf"],
            &["consolaz.ttf"],
        ],
    },
    FamilyFiles {
        needles: &["courier"],
        files: [
            &["cour.ttf", "Courier New.ttf"],
            &["courbd.ttf", "Courier New Bold.ttf"],
            &["couri.ttf", "Courier New Italic.ttf"],
            &["courbi.ttf", "Courier New Bold Italic.ttf"],
        ],
    },
];

const SERIF_FILES: [&[&str]; 4] = [
    &[
        "dejavu/DejaVuSerif.ttf",
        "liberation2/LiberationSerif-Regular.ttf",
        "liberation/LiberationSerif-Regular.ttf",
        "times.ttf",
        "Times New Roman.ttf",
    ],
    &[
        "dejavu/DejaVuSerif-Bold.ttf",
        "liberation2/LiberationSerif-Bold.ttf",
        "liberation/LiberationSerif-Bold.ttf",
        "timesbd.ttf",
        "Times New Roman Bold.ttf",
    ],
    &[
        "dejavu/DejaVuSerif-Italic.ttf",
        "liberation2/LiberationSerif-Italic.ttf",
        "liberation/LiberationSerif-Italic.ttf",
        "timesi.ttf",
        "Times New Roman Italic.ttf",
    ],
    &[
        "dejavu/DejaVuSerif-BoldItalic.ttf",
        "liberation2/LiberationSerif-BoldItalic.ttf",
        "liberation/LiberationSerif-BoldItalic.ttf",
        "timesbi.ttf",
        "Times New Roman Bold Italic.ttf",
    ],
];

const SANS_FILES: [&[&str]; 4] = [
    &[
        "dejavu/DejaVuSans.ttf",
        "liberation2/LiberationSans-Regular.ttf",
        "liberation/LiberationSans-Regular.ttf",
        "arial.ttf",
        "Arial.ttf",
    ],
    &[
        "dejavu/DejaVuSans-Bold.ttf",
        "liberation2/LiberationSans-Bold.ttf",
        "liberation/LiberationSans-Bold.ttf",
        "arialbd.ttf",
        "Arial Bold.ttf",
    ],
    &[
        "dejavu/DejaVuSans-Oblique.ttf",
        "liberation2/LiberationSans-Italic.ttf",
        "liberation/LiberationSans-Italic.ttf",
        "ariali.ttf",
        "Arial Italic.ttf",
    ],
    &[
        "dejavu/DejaVuSans-BoldOblique.ttf",
        "liberation2/LiberationSans-BoldItalic.ttf",
        "liberation/LiberationSans-BoldItalic.ttf",
        "arialbi.ttf",
        "Arial Bold Italic.ttf",
    ],
];

const MONO_FILES: [&[&str]; 4] = [
    &[
        "dejavu/DejaVuSansMono.ttf",
        "liberation2/LiberationMono-Regular.ttf",
        "liberation/LiberationMono-Regular.ttf",
        "consola.ttf",
        "cour.ttf",
        "Courier New.ttf",
    ],
    &[
        "dejavu/DejaVuSansMono-Bold.ttf",
        "liberation2/LiberationMono-Bold.ttf",
        "liberation/LiberationMono-Bold.ttf",
        "consolab.ttf",
        "courbd.ttf",
        "Courier New Bold.ttf",
    ],
    &[
        "dejavu/DejaVuSansMono-Oblique.ttf",
        "liberation2/LiberationMono-Italic.ttf",
        "liberation/LiberationMono-Italic.ttf",
        "consolai.ttf",
        "couri.ttf",
        "Courier New Italic.ttf",
    ],
    &[
        "dejavu/DejaVuSansMono-BoldOblique.ttf",
        "liberation2/LiberationMono-BoldItalic.ttf",
        "liberation/LiberationMono-BoldItalic.ttf",
        "consolaz.ttf",
        "courbi.ttf",
        "Courier New Bold Italic.ttf",
    ],
];

const CM_SERIF_FILES: [&[&str]; 4] = [
    &["cmunrm.ttf", "cmunr.ttf", "lmroman10-regular.otf", "lmroman10-regular.ttf"],
    &["cmunbx.ttf", "cmunb.ttf", "lmroman10-bold.otf", "lmroman10-bold.ttf"],
    &["cmunti.ttf", "cmunri.ttf", "lmroman10-italic.otf", "lmroman10-italic.ttf"],
    &[
        "cmunbi.ttf",
        "cmunbxo.ttf",
        "lmroman10-bolditalic.otf",
        "lmroman10-bolditalic.ttf",
    ],
];

const CM_SANS_FILES: [&[&str]; 4] = [
    &["cmunss.ttf", "lmsans10-regular.otf"],
    &["cmunsx.ttf", "lmsans10-bold.otf"],
    &["cmunsi.ttf", "lmsans10-oblique.otf"],
    &["cmunso.ttf", "lmsans10-boldoblique.otf"],
];

const CM_MONO_FILES: [&[&str]; 4] = [
    &["cmuntt.ttf", "lmmono10-regular.otf"],
    &["cmuntb.ttf", "lmmonolt10-bold.otf"],
    &["cmunit.ttf", "lmmono10-italic.otf"],
    &["cmuntx.ttf", "lmmonolt10-boldoblique.otf"],
];

/// First `root/file` that exists, trying files in order.
fn first_existing<P: AsRef<Path>>(files: &[&str], roots: &[P]) -> Option<PathBuf> {
    files.iter().find_map(|file| {
        roots
            .iter()
            .map(|root| root.as_ref().join(file))
            .find(|path| path.is_file())
    })
}

/// A locale font and whether it belongs to the wanted family itself rather
/// than being a generic stand-in for its bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMatch {
    pub path: PathBuf,
    pub exact_family: bool,
}

/// The installed file of a named family (Calibri, Times New Roman,
/// DejaVu Sans, ...) if the name mentions one.
pub fn named_family_font<P: AsRef<Path>>(
    name: &str,
    bold: bool,
    italic: bool,
    roots: &[P],
) -> Option<PathBuf> {
    let compact: String = name.to_lowercase().chars().filter(|c| *c != ' ').collect();
    let index = style_index(bold, italic);
    NAMED_FAMILIES
        .iter()
        .filter(|family| family.needles.iter().any(|n| compact.contains(n)))
        .find_map(|family| first_existing(family.files[index], roots))
}

/// A generic serif, sans or monospace file for the bucket.
pub fn bucket_font<P: AsRef<Path>>(
    bucket: FamilyBucket,
    bold: bool,
    italic: bool,
    roots: &[P],
) -> Option<PathBuf> {
    let table = match bucket {
        FamilyBucket::Serif | FamilyBucket::ComputerModern => &SERIF_FILES,
        FamilyBucket::Sans => &SANS_FILES,
        FamilyBucket::Mono => &MONO_FILES,
    };
    first_existing(table[style_index(bold, italic)], roots)
}

/// Map a normalized font name to an installed file: the family itself when
/// installed, otherwise the bucket's generic face.
pub fn locale_font<P: AsRef<Path>>(
    normalized: &str,
    bold: bool,
    italic: bool,
    roots: &[P],
) -> Option<LocaleMatch> {
    if normalized.is_empty() {
        return None;
    }
    if let Some(path) = named_family_font(normalized, bold, italic, roots) {
        return Some(LocaleMatch {
            path,
            exact_family: true,
        });
    }
    bucket_font(classify_family(normalized), bold, italic, roots).map(|path| LocaleMatch {
        path,
        exact_family: false,
    })
}

/// Locate an installed CMU or Latin Modern file of the bucket's flavour
/// (serif, sans or typewriter) for the wanted style, searching `dirs` in
/// order.
pub fn computer_modern_font<P: AsRef<Path>>(
    bucket: FamilyBucket,
    bold: bool,
    italic: bool,
    dirs: &[P],
) -> Option<PathBuf> {
    let table = match bucket {
        FamilyBucket::Sans => &CM_SANS_FILES,
        FamilyBucket::Mono => &CM_MONO_FILES,
        FamilyBucket::Serif | FamilyBucket::ComputerModern => &CM_SERIF_FILES,
    };
    let files = table[style_index(bold, italic)];
    dirs.iter().find_map(|dir| first_existing(files, std::slice::from_ref(dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"font").unwrap();
        path
    }

    #[test]
    fn named_family_wins_over_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let calibri_bold = touch(dir.path(), "calibrib.ttf");
        touch(dir.path(), "dejavu/DejaVuSans-Bold.ttf");

        let found = locale_font("calibri-bold", true, false, &[dir.path()]).unwrap();
        assert_eq!(found.path, calibri_bold);
        assert!(found.exact_family);
    }

    #[test]
    fn falls_back_to_bucket_face() {
        let dir = tempfile::tempdir().unwrap();
        let serif_italic = touch(dir.path(), "liberation/LiberationSerif-Italic.ttf");
        touch(dir.path(), "dejavu/DejaVuSans.ttf");

        let found = locale_font("minionpro-it", false, true, &[dir.path()]).unwrap();
        assert_eq!(found.path, serif_italic);
        assert!(!found.exact_family);

        let mono = locale_font("couriernew", false, false, &[dir.path()]);
        assert!(mono.is_none());
    }

    #[test]
    fn roots_are_tried_for_each_file() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let arial = touch(second.path(), "arial.ttf");
        let found = named_family_font("ArialMT", false, false, &[first.path(), second.path()]);
        assert_eq!(found, Some(arial));
    }

    #[test]
    fn computer_modern_prefers_earlier_dirs() {
        let custom = tempfile::tempdir().unwrap();
        let tex = tempfile::tempdir().unwrap();
        touch(tex.path(), "cmunbx.ttf");
        let custom_bold = touch(custom.path(), "lmroman10-bold.otf");

        let dirs = [custom.path(), tex.path()];
        let found = computer_modern_font(FamilyBucket::ComputerModern, true, false, &dirs);
        assert_eq!(found, Some(custom_bold));
        assert!(computer_modern_font(FamilyBucket::ComputerModern, false, true, &dirs).is_none());
    }

    #[test]
    fn computer_modern_flavours_use_their_own_files() {
        let tex = tempfile::tempdir().unwrap();
        touch(tex.path(), "cmunrm.ttf");
        let sans = touch(tex.path(), "cmunsx.ttf");
        let mono = touch(tex.path(), "cmunit.ttf");
        let dirs = [tex.path()];

        assert_eq!(computer_modern_font(FamilyBucket::Sans, true, false, &dirs), Some(sans));
        assert_eq!(computer_modern_font(FamilyBucket::Mono, false, true, &dirs), Some(mono));
        assert!(computer_modern_font(FamilyBucket::Mono, false, false, &dirs).is_none());
        // Typewriter italic is not a serif italic.
        assert!(computer_modern_font(FamilyBucket::ComputerModern, false, true, &dirs).is_none());
    }

    #[test]
    fn empty_name_has_no_locale_font() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "dejavu/DejaVuSans.ttf");
        assert!(locale_font("", false, false, &[dir.path()]).is_none());
    }
}

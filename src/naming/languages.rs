//! ISO 639 language code table.
//!
//! Each row is `(ISO 639-2/B, ISO 639-2/T, ISO 639-1)`. The bibliographic and
//! terminology forms only differ for a handful of languages (fre/fra, ger/deu, ...).

const LANGUAGES: &[(&str, &str, &str)] = &[
    ("aar", "aar", "aa"),
    ("abk", "abk", "ab"),
    ("afr", "afr", "af"),
    ("aka", "aka", "ak"),
    ("alb", "sqi", "sq"),
    ("amh", "amh", "am"),
    ("ara", "ara", "ar"),
    ("arg", "arg", "an"),
    ("arm", "hye", "hy"),
    ("asm", "asm", "as"),
    ("ava", "ava", "av"),
    ("aym", "aym", "ay"),
    ("aze", "aze", "az"),
    ("bak", "bak", "ba"),
    ("bam", "bam", "bm"),
    ("baq", "eus", "eu"),
    ("bel", "bel", "be"),
    ("ben", "ben", "bn"),
    ("bis", "bis", "bi"),
    ("bos", "bos", "bs"),
    ("bre", "bre", "br"),
    ("bul", "bul", "bg"),
    ("bur", "mya", "my"),
    ("cat", "cat", "ca"),
    ("cha", "cha", "ch"),
    ("che", "che", "ce"),
    ("chi", "zho", "zh"),
    ("chv", "chv", "cv"),
    ("cor", "cor", "kw"),
    ("cos", "cos", "co"),
    ("cze", "ces", "cs"),
    ("dan", "dan", "da"),
    ("div", "div", "dv"),
    ("dut", "nld", "nl"),
    ("dzo", "dzo", "dz"),
    ("eng", "eng", "en"),
    ("epo", "epo", "eo"),
    ("est", "est", "et"),
    ("ewe", "ewe", "ee"),
    ("fao", "fao", "fo"),
    ("fij", "fij", "fj"),
    ("fin", "fin", "fi"),
    ("fre", "fra", "fr"),
    ("fry", "fry", "fy"),
    ("ful", "ful", "ff"),
    ("geo", "kat", "ka"),
    ("ger", "deu", "de"),
    ("gla", "gla", "gd"),
    ("gle", "gle", "ga"),
    ("glg", "glg", "gl"),
    ("glv", "glv", "gv"),
    ("gre", "ell", "el"),
    ("grn", "grn", "gn"),
    ("guj", "guj", "gu"),
    ("hat", "hat", "ht"),
    ("hau", "hau", "ha"),
    ("heb", "heb", "he"),
    ("her", "her", "hz"),
    ("hin", "hin", "hi"),
    ("hrv", "hrv", "hr"),
    ("hun", "hun", "hu"),
    ("ibo", "ibo", "ig"),
    ("ice", "isl", "is"),
    ("ido", "ido", "io"),
    ("iku", "iku", "iu"),
    ("ina", "ina", "ia"),
    ("ind", "ind", "id"),
    ("ipk", "ipk", "ik"),
    ("ita", "ita", "it"),
    ("jav", "jav", "jv"),
    ("jpn", "jpn", "ja"),
    ("kal", "kal", "kl"),
    ("kan", "kan", "kn"),
    ("kas", "kas", "ks"),
    ("kaz", "kaz", "kk"),
    ("khm", "khm", "km"),
    ("kik", "kik", "ki"),
    ("kin", "kin", "rw"),
    ("kir", "kir", "ky"),
    ("kor", "kor", "ko"),
    ("kur", "kur", "ku"),
    ("lao", "lao", "lo"),
    ("lat", "lat", "la"),
    ("lav", "lav", "lv"),
    ("lin", "lin", "ln"),
    ("lit", "lit", "lt"),
    ("ltz", "ltz", "lb"),
    ("lug", "lug", "lg"),
    ("mac", "mkd", "mk"),
    ("mal", "mal", "ml"),
    ("mao", "mri", "mi"),
    ("mar", "mar", "mr"),
    ("may", "msa", "ms"),
    ("mlg", "mlg", "mg"),
    ("mlt", "mlt", "mt"),
    ("mon", "mon", "mn"),
    ("nep", "nep", "ne"),
    ("nob", "nob", "nb"),
    ("nno", "nno", "nn"),
    ("nor", "nor", "no"),
    ("nya", "nya", "ny"),
    ("oci", "oci", "oc"),
    ("ori", "ori", "or"),
    ("orm", "orm", "om"),
    ("pan", "pan", "pa"),
    ("per", "fas", "fa"),
    ("pol", "pol", "pl"),
    ("por", "por", "pt"),
    ("pus", "pus", "ps"),
    ("que", "que", "qu"),
    ("roh", "roh", "rm"),
    ("rum", "ron", "ro"),
    ("run", "run", "rn"),
    ("rus", "rus", "ru"),
    ("sag", "sag", "sg"),
    ("san", "san", "sa"),
    ("sin", "sin", "si"),
    ("slo", "slk", "sk"),
    ("slv", "slv", "sl"),
    ("sme", "sme", "se"),
    ("smo", "smo", "sm"),
    ("sna", "sna", "sn"),
    ("snd", "snd", "sd"),
    ("som", "som", "so"),
    ("sot", "sot", "st"),
    ("spa", "spa", "es"),
    ("srd", "srd", "sc"),
    ("srp", "srp", "sr"),
    ("ssw", "ssw", "ss"),
    ("sun", "sun", "su"),
    ("swa", "swa", "sw"),
    ("swe", "swe", "sv"),
    ("tah", "tah", "ty"),
    ("tam", "tam", "ta"),
    ("tat", "tat", "tt"),
    ("tel", "tel", "te"),
    ("tgk", "tgk", "tg"),
    ("tgl", "tgl", "tl"),
    ("tha", "tha", "th"),
    ("tib", "bod", "bo"),
    ("tir", "tir", "ti"),
    ("ton", "ton", "to"),
    ("tsn", "tsn", "tn"),
    ("tso", "tso", "ts"),
    ("tuk", "tuk", "tk"),
    ("tur", "tur", "tr"),
    ("twi", "twi", "tw"),
    ("uig", "uig", "ug"),
    ("ukr", "ukr", "uk"),
    ("urd", "urd", "ur"),
    ("uzb", "uzb", "uz"),
    ("ven", "ven", "ve"),
    ("vie", "vie", "vi"),
    ("vol", "vol", "vo"),
    ("wel", "cym", "cy"),
    ("wln", "wln", "wa"),
    ("wol", "wol", "wo"),
    ("xho", "xho", "xh"),
    ("yid", "yid", "yi"),
    ("yor", "yor", "yo"),
    ("zha", "zha", "za"),
    ("zul", "zul", "zu"),
];

fn find(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let code = code.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(bib, term, short)| *bib == code || *term == code || *short == code)
}

/// Two-letter ISO 639-1 code for any ISO 639 code
pub fn to_iso639_1(code: &str) -> Option<&'static str> {
    find(code).map(|(_, _, short)| *short)
}

/// Three-letter ISO 639-2/B code for any ISO 639 code
pub fn to_iso639_2b(code: &str) -> Option<&'static str> {
    find(code).map(|(bib, _, _)| *bib)
}

// English -> Indonesian meanings used when the translation service is unreachable.
pub const FALLBACK_MEANINGS: &[(&str, &[&str])] = &[
    // Verbs
    ("be", &["adalah", "menjadi", "berada"]),
    ("have", &["mempunyai", "memiliki", "punya"]),
    ("do", &["melakukan", "mengerjakan", "berbuat"]),
    ("say", &["berkata", "mengatakan", "mengucapkan"]),
    ("get", &["mendapat", "memperoleh", "mengambil"]),
    ("make", &["membuat", "menciptakan", "menjadikan"]),
    ("go", &["pergi", "berjalan", "berangkat"]),
    ("know", &["tahu", "mengetahui", "kenal"]),
    ("take", &["mengambil", "membawa", "menerima"]),
    ("see", &["melihat", "memandang", "menonton"]),
    ("come", &["datang", "tiba", "hadir"]),
    ("think", &["berpikir", "mengira", "menganggap"]),
    ("look", &["melihat", "menatap", "tampak"]),
    ("want", &["ingin", "mau", "menginginkan"]),
    ("give", &["memberi", "memberikan", "menyerahkan"]),
    ("use", &["menggunakan", "memakai"]),
    ("find", &["menemukan", "mencari", "mendapati"]),
    ("tell", &["menceritakan", "memberitahu", "mengabarkan"]),
    ("ask", &["bertanya", "meminta", "menanyakan"]),
    ("work", &["bekerja", "kerja", "pekerjaan"]),
    ("feel", &["merasa", "merasakan", "perasaan"]),
    ("try", &["mencoba", "berusaha", "coba"]),
    ("leave", &["meninggalkan", "pergi", "keluar"]),
    ("call", &["memanggil", "menelepon", "menyebut"]),
    // Nouns
    ("time", &["waktu", "masa", "kali"]),
    ("person", &["orang", "pribadi", "individu"]),
    ("year", &["tahun"]),
    ("way", &["cara", "jalan", "metode"]),
    ("day", &["hari", "siang"]),
    ("thing", &["hal", "benda", "sesuatu"]),
    ("man", &["pria", "laki-laki", "orang"]),
    ("world", &["dunia", "bumi"]),
    ("life", &["kehidupan", "hidup", "nyawa"]),
    ("hand", &["tangan"]),
    ("part", &["bagian", "sebagian", "komponen"]),
    ("child", &["anak", "bocah"]),
    ("eye", &["mata", "pandangan"]),
    ("woman", &["wanita", "perempuan"]),
    ("place", &["tempat", "lokasi", "wilayah"]),
    ("week", &["minggu", "pekan"]),
    ("case", &["kasus", "hal", "keadaan"]),
    ("point", &["poin", "titik", "hal"]),
    ("home", &["rumah", "tempat tinggal", "kampung halaman"]),
    ("water", &["air", "cairan"]),
    ("room", &["ruang", "kamar", "tempat"]),
    ("mother", &["ibu", "mama"]),
    ("area", &["area", "daerah", "wilayah"]),
    ("money", &["uang", "duit", "modal"]),
    ("story", &["cerita", "kisah", "dongeng"]),
    ("fact", &["fakta", "kenyataan"]),
    ("month", &["bulan"]),
    ("study", &["belajar", "studi", "penelitian"]),
    ("book", &["buku", "kitab"]),
    ("word", &["kata", "perkataan", "ucapan"]),
    ("business", &["bisnis", "usaha", "perdagangan"]),
    ("issue", &["masalah", "isu", "terbitan"]),
    ("side", &["sisi", "samping", "pihak"]),
    ("kind", &["jenis", "macam", "baik hati"]),
    ("head", &["kepala", "ketua", "pimpinan"]),
    ("house", &["rumah", "gedung"]),
    ("service", &["layanan", "jasa", "dinas"]),
    ("friend", &["teman", "sahabat", "kawan"]),
    ("father", &["ayah", "bapak", "papa"]),
    ("power", &["kekuatan", "tenaga", "listrik"]),
    ("hour", &["jam", "waktu"]),
    ("game", &["permainan", "pertandingan"]),
    ("line", &["garis", "baris", "antrian"]),
    ("end", &["akhir", "ujung", "tamat"]),
    ("member", &["anggota", "peserta"]),
    ("law", &["hukum", "undang-undang", "aturan"]),
    ("car", &["mobil"]),
    ("city", &["kota", "perkotaan"]),
    ("community", &["komunitas", "masyarakat", "lingkungan"]),
    ("name", &["nama", "sebutan"]),
    ("president", &["presiden", "ketua"]),
    ("team", &["tim", "kelompok", "regu"]),
    ("idea", &["ide", "gagasan", "pikiran"]),
    ("body", &["tubuh", "badan"]),
    ("information", &["informasi", "keterangan", "data"]),
    ("face", &["wajah", "muka"]),
    ("level", &["tingkat", "level", "taraf"]),
    ("office", &["kantor", "jabatan"]),
    ("door", &["pintu", "gerbang"]),
    ("health", &["kesehatan"]),
    ("art", &["seni", "kesenian"]),
    ("war", &["perang", "peperangan"]),
    ("history", &["sejarah", "riwayat"]),
    ("party", &["pesta", "partai", "kelompok"]),
    ("result", &["hasil", "akibat", "kesimpulan"]),
    ("change", &["perubahan", "ganti", "uang kembalian"]),
    ("morning", &["pagi"]),
    ("reason", &["alasan", "sebab"]),
    ("research", &["penelitian", "riset"]),
    ("girl", &["gadis", "perempuan", "anak perempuan"]),
    ("moment", &["saat", "momen", "waktu"]),
    ("air", &["udara", "angin"]),
    ("teacher", &["guru", "pengajar"]),
    ("force", &["kekuatan", "paksaan", "pasukan"]),
    ("education", &["pendidikan", "pengajaran"]),
    ("currency", &["mata uang", "valuta"]),
    ("ship", &["kapal", "perahu"]),
    // Adjectives
    ("good", &["baik", "bagus", "hebat"]),
    ("new", &["baru", "segar"]),
    ("first", &["pertama", "awal"]),
    ("long", &["panjang", "lama"]),
    ("great", &["hebat", "besar", "bagus"]),
    ("little", &["kecil", "sedikit"]),
    ("old", &["tua", "lama"]),
    ("big", &["besar", "raya"]),
    ("high", &["tinggi"]),
    ("different", &["berbeda", "beda"]),
    ("small", &["kecil"]),
    ("large", &["besar", "luas"]),
    ("next", &["berikutnya", "selanjutnya"]),
    ("early", &["awal", "dini", "cepat"]),
    ("young", &["muda", "remaja"]),
    ("important", &["penting", "utama"]),
    ("few", &["sedikit", "beberapa"]),
    ("public", &["umum", "publik"]),
    ("bad", &["buruk", "jelek", "jahat"]),
    ("same", &["sama", "serupa"]),
    ("able", &["mampu", "bisa", "sanggup"]),
];

pub fn lookup(word: &str) -> Option<Vec<String>> {
    let word = word.trim().to_lowercase();
    FALLBACK_MEANINGS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, meanings)| meanings.iter().map(|m| m.to_string()).collect())
}

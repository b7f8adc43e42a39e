use pianola_ports::types::MidiNote;

const SHARP_NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn note_name(note: MidiNote) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", SHARP_NOTES[note as usize % 12], octave)
}

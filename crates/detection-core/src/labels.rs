//! Object class names and their spoken labels

/// COCO-80 class names, indexed by the detector's 0-based class id
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Class name for a 0-based COCO id
pub fn coco_class_name(class_id: usize) -> Option<&'static str> {
    COCO_CLASSES.get(class_id).copied()
}

/// Spanish display label for a class; unknown classes pass through
pub fn translate_object_name(class_name: &str) -> String {
    let label = match class_name.to_lowercase().as_str() {
        "person" => "Persona",
        "car" => "Auto",
        "truck" => "Camión",
        "bus" => "Autobús",
        "motorcycle" => "Motocicleta",
        "bicycle" => "Bicicleta",
        "chair" => "Silla",
        "bench" => "Banca",
        "potted plant" => "Planta",
        "stop sign" => "Señal de alto",
        "traffic light" => "Semáforo",
        "fire hydrant" => "Hidrante",
        "parking meter" => "Parquímetro",
        "dog" => "Perro",
        "cat" => "Gato",
        "bird" => "Pájaro",
        "horse" => "Caballo",
        "sheep" => "Oveja",
        "cow" => "Vaca",
        "backpack" => "Mochila",
        "umbrella" => "Paraguas",
        "handbag" => "Bolso",
        "suitcase" => "Maleta",
        "bottle" => "Botella",
        "cup" => "Taza",
        "couch" => "Sofá",
        "bed" => "Cama",
        "dining table" => "Mesa",
        "tv" => "Televisor",
        "laptop" => "Laptop",
        "skateboard" => "Patineta",
        "sports ball" => "Pelota",
        "kite" => "Cometa",
        "frisbee" => "Disco volador",
        _ => return class_name.to_string(),
    };
    label.to_string()
}
